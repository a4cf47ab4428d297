//! Photo grid: grid and masonry layouts of cards.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use ratatui_image::StatefulImage;

use crate::gallery::ViewMode;
use crate::photo::{Category, Photo};
use crate::ui::images::{ImageCache, ImageKey, ImageStatus};

/// Thumbnail size options for the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ThumbnailSize {
    /// Approximate cell width in terminal columns
    pub fn cell_width(&self) -> u16 {
        match self {
            ThumbnailSize::Small => 24,
            ThumbnailSize::Medium => 32,
            ThumbnailSize::Large => 48,
        }
    }

    /// Approximate cell height in terminal rows
    pub fn cell_height(&self) -> u16 {
        match self {
            ThumbnailSize::Small => 12,
            ThumbnailSize::Medium => 16,
            ThumbnailSize::Large => 24,
        }
    }

    /// Pixel size thumbnails are decoded at
    pub fn pixel_size(&self) -> u32 {
        match self {
            ThumbnailSize::Small => 128,
            ThumbnailSize::Medium => 256,
            ThumbnailSize::Large => 512,
        }
    }

    pub fn cycle_next(&self) -> Self {
        match self {
            ThumbnailSize::Small => ThumbnailSize::Medium,
            ThumbnailSize::Medium => ThumbnailSize::Large,
            ThumbnailSize::Large => ThumbnailSize::Small,
        }
    }

    pub fn cycle_prev(&self) -> Self {
        match self {
            ThumbnailSize::Small => ThumbnailSize::Large,
            ThumbnailSize::Medium => ThumbnailSize::Small,
            ThumbnailSize::Large => ThumbnailSize::Medium,
        }
    }
}

/// Rows of text under the image: title, description excerpt, badge line.
const TEXT_ROWS: u16 = 3;

/// Selection and scroll state of the photo grid.
///
/// `selected` indexes the visible set, which the app re-derives on every
/// frame; the view never owns photos.
#[derive(Debug, Default)]
pub struct GalleryView {
    pub selected: usize,
    /// First visible row (grid) or first visible card row (masonry)
    pub scroll_offset: usize,
    pub thumbnail_size: ThumbnailSize,
    /// Layout of the last rendered frame, used for keyboard navigation
    pub last_columns: usize,
    pub last_rows: usize,
}

impl GalleryView {
    pub fn new() -> Self {
        Self {
            last_columns: 1,
            last_rows: 1,
            ..Self::default()
        }
    }

    /// Number of columns that fit in `area_width`
    pub fn columns(&self, area_width: u16) -> usize {
        (area_width / self.thumbnail_size.cell_width()).max(1) as usize
    }

    /// Number of grid rows that fit in `area_height`
    pub fn visible_rows(&self, area_height: u16) -> usize {
        (area_height / self.thumbnail_size.cell_height()).max(1) as usize
    }

    /// Keep `selected` inside a visible set of `len` photos.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn move_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_right(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self, columns: usize) {
        if self.selected >= columns {
            self.selected -= columns;
        }
    }

    pub fn move_down(&mut self, columns: usize, len: usize) {
        let new_idx = self.selected + columns;
        if new_idx < len {
            self.selected = new_idx;
        }
    }

    pub fn move_to_start(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn move_to_end(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub fn page_up(&mut self, columns: usize, visible_rows: usize) {
        self.selected = self.selected.saturating_sub(columns * visible_rows);
    }

    pub fn page_down(&mut self, columns: usize, visible_rows: usize, len: usize) {
        let new_idx = self.selected + columns * visible_rows;
        self.selected = new_idx.min(len.saturating_sub(1));
    }

    /// Scroll so the selected row is inside the window of `visible_rows`.
    pub fn ensure_visible(&mut self, columns: usize, visible_rows: usize) {
        let selected_row = self.selected / columns;

        if selected_row < self.scroll_offset {
            self.scroll_offset = selected_row;
        }

        if selected_row >= self.scroll_offset + visible_rows {
            self.scroll_offset = selected_row + 1 - visible_rows;
        }
    }

    pub fn increase_size(&mut self) {
        self.thumbnail_size = self.thumbnail_size.cycle_next();
    }

    pub fn decrease_size(&mut self) {
        self.thumbnail_size = self.thumbnail_size.cycle_prev();
    }

    fn image_rows(&self) -> u16 {
        self.thumbnail_size.cell_height().saturating_sub(TEXT_ROWS + 2)
    }

    /// Height of a masonry card. Cards with a description get extra lines
    /// and every third card a taller image, so columns drift apart.
    fn masonry_height(&self, index: usize, photo: &Photo) -> u16 {
        let cell_width = self.thumbnail_size.cell_width().saturating_sub(2).max(1) as usize;
        let description_rows = photo
            .description
            .as_deref()
            .map(|d| (d.chars().count().div_ceil(cell_width)).clamp(1, 3) as u16)
            .unwrap_or(0);
        let image_rows = match index % 3 {
            0 => self.image_rows() + self.image_rows() / 3,
            1 => self.image_rows(),
            _ => self.image_rows().saturating_sub(self.image_rows() / 4),
        };
        image_rows + description_rows + 2 + 2
    }

    /// Masonry scroll: advance whole card rows until the selected card's
    /// bottom edge fits into `height`.
    fn ensure_visible_masonry(&mut self, photos: &[&Photo], columns: usize, height: u16) {
        let selected_row = self.selected / columns;
        if selected_row < self.scroll_offset {
            self.scroll_offset = selected_row;
        }

        let column = self.selected % columns;
        loop {
            let bottom: u32 = (self.scroll_offset..=selected_row)
                .map(|row| row * columns + column)
                .filter_map(|idx| photos.get(idx).map(|p| self.masonry_height(idx, p) as u32))
                .sum();
            if bottom <= height as u32 || self.scroll_offset >= selected_row {
                break;
            }
            self.scroll_offset += 1;
        }
    }
}

/// Foreground color of a category badge.
pub fn category_color(category: Category) -> Color {
    match category {
        Category::Puppy => Color::LightMagenta,
        Category::Adult => Color::LightBlue,
        Category::Action => Color::LightGreen,
        Category::Portrait => Color::Magenta,
        Category::Uncategorized => Color::Gray,
    }
}

/// Card date, e.g. `Mar 5, 2025`.
pub fn format_card_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%b %-d, %Y").to_string()
}

/// Render the photo grid for the visible set.
pub fn render(
    frame: &mut Frame,
    view: &mut GalleryView,
    images: &mut ImageCache,
    photos: &[&Photo],
    mode: ViewMode,
    filter_active: bool,
    area: Rect,
) {
    if photos.is_empty() {
        render_empty(frame, filter_active, area);
        return;
    }

    images.set_thumbnail_size(view.thumbnail_size.pixel_size());
    view.clamp(photos.len());

    let columns = view.columns(area.width);
    let visible_rows = view.visible_rows(area.height);
    view.last_columns = columns;
    view.last_rows = visible_rows;

    match mode {
        ViewMode::Grid => {
            view.ensure_visible(columns, visible_rows);
            render_grid(frame, view, images, photos, area, columns, visible_rows);
        }
        ViewMode::Masonry => {
            view.ensure_visible_masonry(photos, columns, area.height);
            render_masonry(frame, view, images, photos, area, columns);
        }
    }
}

fn render_empty(frame: &mut Frame, filter_active: bool, area: Rect) {
    let (title, hint) = if filter_active {
        ("No photos found", "Try adjusting your search or filters.")
    } else {
        ("No photos yet", "Upload your first dog photo to get started! Press u.")
    };

    let lines = vec![
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];

    let y = area.y + area.height.saturating_sub(lines.len() as u16) / 2;
    let centered = Rect::new(area.x, y, area.width, (lines.len() as u16).min(area.height));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
}

fn render_grid(
    frame: &mut Frame,
    view: &GalleryView,
    images: &mut ImageCache,
    photos: &[&Photo],
    area: Rect,
    columns: usize,
    visible_rows: usize,
) {
    let cell_width = view.thumbnail_size.cell_width();
    let cell_height = view.thumbnail_size.cell_height();

    for row in 0..visible_rows {
        let actual_row = view.scroll_offset + row;
        for col in 0..columns {
            let idx = actual_row * columns + col;
            let Some(photo) = photos.get(idx) else {
                return;
            };
            let cell = Rect::new(
                area.x + col as u16 * cell_width,
                area.y + row as u16 * cell_height,
                cell_width,
                cell_height,
            )
            .intersection(area);
            render_card(frame, images, photo, cell, idx == view.selected);
        }
    }
}

fn render_masonry(
    frame: &mut Frame,
    view: &GalleryView,
    images: &mut ImageCache,
    photos: &[&Photo],
    area: Rect,
    columns: usize,
) {
    let cell_width = view.thumbnail_size.cell_width();

    for col in 0..columns {
        let x = area.x + col as u16 * cell_width;
        let mut y = area.y;

        let mut row = view.scroll_offset;
        while y < area.bottom() {
            let idx = row * columns + col;
            let Some(photo) = photos.get(idx) else {
                break;
            };
            let height = view.masonry_height(idx, photo);
            let card = Rect::new(x, y, cell_width, height).intersection(area);
            render_card(frame, images, photo, card, idx == view.selected);
            y = y.saturating_add(height);
            row += 1;
        }
    }
}

fn render_card(frame: &mut Frame, images: &mut ImageCache, photo: &Photo, area: Rect, is_selected: bool) {
    if area.width < 4 || area.height < 3 {
        return;
    }

    let border_color = if is_selected { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let description_rows = if photo.description.is_some() {
        inner.height.saturating_sub(TEXT_ROWS + 3).min(3).max(1)
    } else {
        0
    };
    let text_rows = 2 + description_rows;
    let image_area = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(text_rows));
    let text_area = Rect::new(
        inner.x,
        inner.y + image_area.height,
        inner.width,
        inner.height - image_area.height,
    );

    render_thumbnail(frame, images, photo, image_area);

    let width = inner.width as usize;
    let heart = if photo.is_favorite { " ♥" } else { "" };
    let title = truncate(&photo.title, width.saturating_sub(heart.chars().count()));
    let mut lines = vec![Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(heart, Style::default().fg(Color::Red)),
    ])];

    if let Some(ref description) = photo.description {
        let excerpt = truncate(description, width * description_rows as usize);
        for chunk in wrap_chars(&excerpt, width).into_iter().take(description_rows as usize) {
            lines.push(Line::from(Span::styled(chunk, Style::default().fg(Color::Gray))));
        }
    }

    let badge = format!(" {} ", photo.category.label());
    let date = format_card_date(&photo.created_at);
    let padding = width.saturating_sub(badge.chars().count() + date.chars().count());
    lines.push(Line::from(vec![
        Span::styled(
            badge,
            Style::default().fg(Color::Black).bg(category_color(photo.category)),
        ),
        Span::raw(" ".repeat(padding)),
        Span::styled(date, Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(Paragraph::new(lines), text_area);
}

fn render_thumbnail(frame: &mut Frame, images: &mut ImageCache, photo: &Photo, area: Rect) {
    if area.width < 2 || area.height < 1 {
        return;
    }

    let key = ImageKey::Thumbnail(photo.id.clone());
    match images.request(&key, &photo.image_url) {
        ImageStatus::Ready => {
            if let Some(protocol) = images.get_mut(&key) {
                frame.render_stateful_widget(StatefulImage::new(None), area, protocol);
            }
        }
        ImageStatus::Loading => render_placeholder(frame, "Loading...", area),
        ImageStatus::Unavailable => render_placeholder(frame, "Image unavailable", area),
    }
}

pub fn render_placeholder(frame: &mut Frame, text: &str, area: Rect) {
    if area.height == 0 {
        return;
    }
    let placeholder = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    let centered = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    frame.render_widget(placeholder, centered);
}

/// Shorten to at most `max` chars, ending in "..." when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(&"..."[..max.min(3)]);
    out
}

fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_navigation_stays_in_bounds() {
        let mut view = GalleryView::new();
        let len = 10;

        view.move_left();
        assert_eq!(view.selected, 0);

        view.move_down(4, len);
        view.move_down(4, len);
        assert_eq!(view.selected, 8);
        view.move_down(4, len);
        assert_eq!(view.selected, 8);

        view.move_right(len);
        view.move_right(len);
        assert_eq!(view.selected, 9);

        view.move_up(4);
        assert_eq!(view.selected, 5);

        view.page_down(4, 3, len);
        assert_eq!(view.selected, 9);
        view.page_up(4, 3);
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn test_clamp_after_visible_set_shrinks() {
        let mut view = GalleryView::new();
        view.selected = 7;
        view.clamp(3);
        assert_eq!(view.selected, 2);
        view.clamp(0);
        assert_eq!(view.selected, 0);
        assert_eq!(view.scroll_offset, 0);
    }

    #[test]
    fn test_ensure_visible_scrolls_both_ways() {
        let mut view = GalleryView::new();
        view.selected = 13;
        view.ensure_visible(4, 2);
        assert_eq!(view.scroll_offset, 2);

        view.selected = 1;
        view.ensure_visible(4, 2);
        assert_eq!(view.scroll_offset, 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Buddy", 10), "Buddy");
        assert_eq!(truncate("Buddy's First Day", 8), "Buddy...");
        assert_eq!(truncate("Buddy", 2), "..");
    }

    #[test]
    fn test_wrap_chars() {
        assert_eq!(wrap_chars("abcdef", 4), vec!["abcd", "ef"]);
        assert!(wrap_chars("abc", 0).is_empty());
    }
}
