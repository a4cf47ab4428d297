//! Screens shown before a session exists.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render_loading(frame: &mut Frame, area: Rect) {
    let text = Paragraph::new("Loading...")
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    let y = area.y + area.height / 2;
    frame.render_widget(text, Rect::new(area.x, y, area.width, 1.min(area.height)));
}

pub fn render(frame: &mut Frame, error: Option<&str>, area: Rect) {
    let dialog_width = 56.min(area.width.saturating_sub(4));
    let dialog_height = 12.min(area.height);

    let x = area.x + (area.width - dialog_width) / 2;
    let y = area.y + (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let mut lines = vec![
        Line::from(Span::styled(
            "🐕 Dogallery",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Your personal collection of dog photos."),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("Sign in    "),
            Span::styled("[q] ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw("Quit"),
        ]),
    ];

    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Sign In "),
        );
    frame.render_widget(paragraph, dialog_area);
}
