//! Full-size view of one photo with its metadata.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use ratatui_image::StatefulImage;

use crate::photo::{Photo, PhotoId};
use crate::ui::gallery::{category_color, render_placeholder};
use crate::ui::images::{ImageCache, ImageKey, ImageStatus};

/// Which photo is open. Looked up in the collection on every frame, so a
/// favorite toggle shows immediately and a deleted photo closes the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub photo_id: PhotoId,
}

impl DetailView {
    pub fn new(photo_id: PhotoId) -> Self {
        Self { photo_id }
    }
}

/// Upload timestamp, e.g. `Tuesday, March 4, 2025, 09:05 AM`.
pub fn format_uploaded(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%A, %B %-d, %Y, %I:%M %p")
        .to_string()
}

pub fn render(frame: &mut Frame, photo: &Photo, images: &mut ImageCache, area: Rect) {
    let dialog_width = area.width.saturating_sub(4);
    let dialog_height = area.height.saturating_sub(2);
    let dialog_area = Rect::new(
        area.x + (area.width - dialog_width) / 2,
        area.y + (area.height - dialog_height) / 2,
        dialog_width,
        dialog_height,
    );

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", photo.title))
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(inner);

    let key = ImageKey::Full(photo.id.clone());
    match images.request(&key, &photo.image_url) {
        ImageStatus::Ready => {
            if let Some(protocol) = images.get_mut(&key) {
                frame.render_stateful_widget(StatefulImage::new(None), chunks[0], protocol);
            }
        }
        ImageStatus::Loading => render_placeholder(frame, "Loading...", chunks[0]),
        ImageStatus::Unavailable => render_placeholder(frame, "Image unavailable", chunks[0]),
    }

    render_info(frame, photo, chunks[1]);
}

fn render_info(frame: &mut Frame, photo: &Photo, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let heart = if photo.is_favorite {
        Span::styled("♥ Favorited", Style::default().fg(Color::Red))
    } else {
        Span::styled("♡ Not a favorite", Style::default().fg(Color::Gray))
    };

    let mut lines = vec![
        Line::from(Span::styled(
            photo.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(ref description) = photo.description {
        lines.push(Line::from(description.clone()));
        lines.push(Line::from(""));
    }

    lines.extend([
        Line::from(heart),
        Line::from(""),
        Line::from(Span::styled("Category", label)),
        Line::from(Span::styled(
            format!(" {} ", photo.category.label()),
            Style::default().fg(Color::Black).bg(category_color(photo.category)),
        )),
        Line::from(""),
        Line::from(Span::styled("Uploaded", label)),
        Line::from(format_uploaded(&photo.created_at)),
        Line::from(""),
        Line::from(Span::styled("f:favorite  s:download  Esc:close", label)),
    ]);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::LEFT).border_style(label));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uploaded_shape() {
        let date = Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap();
        let formatted = format_uploaded(&date);
        let local = date.with_timezone(&Local);
        assert!(formatted.starts_with(&local.format("%A, %B").to_string()));
        assert!(formatted.ends_with("AM") || formatted.ends_with("PM"));
        assert!(formatted.contains("2025"));
    }
}
