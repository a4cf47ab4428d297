use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render_help(frame: &mut Frame, area: Rect) {
    // Center the help dialog
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 36.min(area.height.saturating_sub(2));

    let x = area.x + (area.width - dialog_width) / 2;
    let y = area.y + (area.height - dialog_height) / 2;

    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    // Clear the area behind the dialog
    frame.render_widget(Clear, dialog_area);

    let heading = Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan);
    let help_text = vec![
        Line::from(Span::styled("Navigation", heading)),
        Line::from(""),
        Line::from("  h/j/k/l / arrows   Move selection"),
        Line::from("  g / G              First / last photo"),
        Line::from("  PgUp / PgDn        Page up / down"),
        Line::from("  Enter              View photo details"),
        Line::from("  + / -              Larger / smaller cards"),
        Line::from(""),
        Line::from(Span::styled("Filtering", heading)),
        Line::from(""),
        Line::from("  /                  Search titles and descriptions"),
        Line::from("  Ctrl+U             Clear search (while searching)"),
        Line::from("  Tab / Shift+Tab    Next / previous category"),
        Line::from("  ] / [              Next / previous category"),
        Line::from("  F                  Favorites only"),
        Line::from("  c                  Clear all filters"),
        Line::from("  v                  Toggle grid / masonry"),
        Line::from(""),
        Line::from(Span::styled("Photos", heading)),
        Line::from(""),
        Line::from("  u                  Upload a photo"),
        Line::from("  f                  Toggle favorite"),
        Line::from("  d                  Delete photo"),
        Line::from("  s                  Download (in detail view)"),
        Line::from("  Esc                Cancel running upload"),
        Line::from(""),
        Line::from(Span::styled("Session", heading)),
        Line::from(""),
        Line::from("  o                  Sign out"),
        Line::from("  ?                  Show this help"),
        Line::from("  q                  Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, dialog_area);
}
