//! Upload form: pick a file, name it, describe it, file it under a category.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use ratatui_image::StatefulImage;

use crate::error::IntakeError;
use crate::intake::{normalize_dropped_path, PreparedUpload, UploadDraft};
use crate::photo::Category;
use crate::ui::gallery::{category_color, render_placeholder};
use crate::ui::images::{ImageCache, ImageKey, ImageStatus};
use crate::ui::input::{self, TextInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    File,
    Title,
    Description,
    Category,
    Submit,
}

impl UploadField {
    const ORDER: [UploadField; 5] = [
        UploadField::File,
        UploadField::Title,
        UploadField::Description,
        UploadField::Category,
        UploadField::Submit,
    ];

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

pub struct UploadDialog {
    pub focus: UploadField,
    pub path: TextInput,
    pub title: TextInput,
    pub description: TextInput,
    draft: UploadDraft,
    /// Bumped on every selection so the preview cache never shows a stale file
    preview_generation: u64,
    /// Validation or upload error shown under the form
    pub error: Option<String>,
    pub is_uploading: bool,
}

impl UploadDialog {
    pub fn new() -> Self {
        Self {
            focus: UploadField::File,
            path: TextInput::new(),
            title: TextInput::new(),
            description: TextInput::new(),
            draft: UploadDraft::new(),
            preview_generation: 0,
            error: None,
            is_uploading: false,
        }
    }

    pub fn category(&self) -> Category {
        self.draft.category
    }

    pub fn has_file(&self) -> bool {
        self.draft.file.is_some()
    }

    pub fn preview_key(&self) -> ImageKey {
        ImageKey::UploadPreview(self.preview_generation)
    }

    pub fn can_submit(&self) -> bool {
        !self.is_uploading && self.has_file() && !self.title.text().trim().is_empty()
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn cycle_category(&mut self, forward: bool) {
        self.draft.category = if forward {
            self.draft.category.cycle_next()
        } else {
            self.draft.category.cycle_prev()
        };
    }

    /// Text input under focus, if the focused field is editable.
    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            UploadField::File => Some(&mut self.path),
            UploadField::Title => Some(&mut self.title),
            UploadField::Description => Some(&mut self.description),
            UploadField::Category | UploadField::Submit => None,
        }
    }

    /// Load the file named in the path field.
    pub fn select_from_input(&mut self, max_size: u64) -> Result<(), IntakeError> {
        let path = normalize_dropped_path(self.path.text());
        self.draft.title = self.title.text().to_string();

        match self.draft.select_file(&path, max_size) {
            Ok(()) => {
                self.path.set_text(path.display().to_string());
                self.title.set_text(self.draft.title.clone());
                self.preview_generation += 1;
                self.error = None;
                tracing::debug!("Selected {:?} for upload", path);
                Ok(())
            }
            Err(e) => {
                self.draft.clear_file();
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop the selected file and empty the path field.
    pub fn clear_file(&mut self) {
        self.draft.clear_file();
        self.path.clear();
        self.error = None;
    }

    /// A paste on the File field replaces it and selects the file at once.
    pub fn paste(&mut self, text: &str, max_size: u64) {
        match self.focus {
            UploadField::File => {
                self.path.set_text(text.trim());
                let _ = self.select_from_input(max_size);
            }
            _ => {
                if let Some(input) = self.focused_input() {
                    input.insert_str(text);
                }
            }
        }
    }

    /// Validate the form into an upload ready for storage.
    pub fn prepare(&mut self) -> Result<PreparedUpload, IntakeError> {
        self.draft.title = self.title.text().to_string();
        self.draft.description = self.description.text().to_string();
        let prepared = self.draft.prepare();
        if let Err(ref e) = prepared {
            self.error = Some(e.to_string());
        }
        prepared
    }

    pub fn selected_bytes(&self) -> Option<&[u8]> {
        self.draft.file.as_ref().map(|f| f.bytes.as_slice())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for UploadDialog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(frame: &mut Frame, dialog: &UploadDialog, images: &mut ImageCache, area: Rect) {
    let dialog_width = 72.min(area.width.saturating_sub(4));
    let dialog_height = 30.min(area.height.saturating_sub(2));

    let x = area.x + (area.width - dialog_width) / 2;
    let y = area.y + (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Upload Dog Photo ");
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // File
            Constraint::Min(4),    // Preview
            Constraint::Length(3), // Title
            Constraint::Length(3), // Description
            Constraint::Length(1), // Category
            Constraint::Length(1), // Submit
            Constraint::Length(2), // Status
            Constraint::Length(1), // Help
        ])
        .margin(1)
        .split(dialog_area);

    render_field(frame, dialog, UploadField::File, &dialog.path, " File (type or drop a path, Enter to load) ", chunks[0], "/path/to/dog.jpg");
    render_preview(frame, dialog, images, chunks[1]);
    render_field(frame, dialog, UploadField::Title, &dialog.title, " Title ", chunks[2], "Give your photo a title...");
    render_field(frame, dialog, UploadField::Description, &dialog.description, " Description (optional) ", chunks[3], "Tell us about this photo...");

    let category_focused = dialog.focus == UploadField::Category;
    let category = dialog.category();
    let category_line = Line::from(vec![
        Span::styled(
            " Category: ",
            if category_focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            },
        ),
        Span::raw(if category_focused { "◀ " } else { "  " }),
        Span::styled(
            format!(" {} ", category.label()),
            Style::default().fg(Color::Black).bg(category_color(category)),
        ),
        Span::raw(if category_focused { " ▶" } else { "" }),
    ]);
    frame.render_widget(Paragraph::new(category_line), chunks[4]);

    let submit_label = if dialog.is_uploading { " Uploading... " } else { " Upload Photo " };
    let submit_style = if dialog.focus == UploadField::Submit {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else if dialog.can_submit() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(submit_label, submit_style)).alignment(Alignment::Center),
        chunks[5],
    );

    if let Some(ref error) = dialog.error {
        let status = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, chunks[6]);
    }

    let help = Paragraph::new("Tab/↑↓:field | ←→:category | Enter:load/submit | Ctrl+U:clear | Esc:cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[7]);
}

fn render_field(
    frame: &mut Frame,
    dialog: &UploadDialog,
    field: UploadField,
    value: &TextInput,
    title: &str,
    area: Rect,
    placeholder: &str,
) {
    let focused = dialog.focus == field && !dialog.is_uploading;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());
    input::render(frame, value, block, area, focused, placeholder);
}

fn render_preview(frame: &mut Frame, dialog: &UploadDialog, images: &mut ImageCache, area: Rect) {
    let Some(bytes) = dialog.selected_bytes() else {
        render_placeholder(frame, "No file selected", area);
        return;
    };

    let key = dialog.preview_key();
    match images.request_bytes(&key, bytes) {
        ImageStatus::Ready => {
            if let Some(protocol) = images.get_mut(&key) {
                frame.render_stateful_widget(StatefulImage::new(None), area, protocol);
            }
        }
        ImageStatus::Loading => render_placeholder(frame, "Loading preview...", area),
        ImageStatus::Unavailable => render_placeholder(frame, "Preview unavailable", area),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::io::Cursor;

    const MAX: u64 = 1024 * 1024;

    fn write_png(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, buf).unwrap();
        path
    }

    #[test]
    fn test_paste_on_file_field_selects_and_titles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "good boy.png");

        let mut dialog = UploadDialog::new();
        dialog.paste(&format!("'{}'", path.display()), MAX);

        assert!(dialog.has_file());
        assert_eq!(dialog.title.text(), "Good boy");
        assert!(dialog.error.is_none());
        assert_eq!(dialog.preview_key(), ImageKey::UploadPreview(1));
        assert!(dialog.can_submit());

        dialog.clear_file();
        assert!(!dialog.has_file());
        assert!(dialog.path.is_empty());
        assert!(!dialog.can_submit());
    }

    #[test]
    fn test_typed_title_survives_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "rex.png");

        let mut dialog = UploadDialog::new();
        dialog.title.set_text("Rex at the lake");
        dialog.path.set_text(path.display().to_string());
        dialog.select_from_input(MAX).unwrap();

        assert_eq!(dialog.title.text(), "Rex at the lake");
    }

    #[test]
    fn test_rejected_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let mut dialog = UploadDialog::new();
        dialog.path.set_text(path.display().to_string());
        assert!(matches!(
            dialog.select_from_input(MAX),
            Err(IntakeError::NotAnImage { .. })
        ));
        assert!(!dialog.has_file());
        assert!(dialog.error.is_some());
    }

    #[test]
    fn test_prepare_requires_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "rex.png");

        let mut dialog = UploadDialog::new();
        dialog.paste(&path.display().to_string(), MAX);
        dialog.title.set_text("   ");

        assert!(!dialog.can_submit());
        assert!(matches!(dialog.prepare(), Err(IntakeError::MissingTitle)));
        assert_eq!(dialog.error.as_deref(), Some("Give your photo a title"));

        dialog.title.set_text("Rex");
        dialog.description.set_text("  ");
        dialog.cycle_category(true);
        let prepared = dialog.prepare().unwrap();
        assert_eq!(prepared.title, "Rex");
        assert_eq!(prepared.description, None);
        assert_eq!(prepared.category, Category::Uncategorized.cycle_next());
    }

    #[test]
    fn test_focus_wraps() {
        assert_eq!(UploadField::Submit.next(), UploadField::File);
        assert_eq!(UploadField::File.prev(), UploadField::Submit);
    }
}
