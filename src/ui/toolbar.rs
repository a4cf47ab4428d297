//! Header, search bar and category tabs above the grid.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, AppMode};
use crate::photo::CategoryFilter;
use crate::ui::input;

pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " 🐕 Dogallery ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    if let Some(ref user) = app.user {
        spans.push(Span::styled(
            format!(" {} ", user.email),
            Style::default().fg(Color::Gray),
        ));
    }

    if app.filter.show_favorites_only {
        spans.push(Span::styled(
            " ♥ Favorites only ",
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    }

    spans.push(Span::styled(
        format!(" {} view ", app.filter.view_mode.label()),
        Style::default().fg(Color::DarkGray),
    ));

    let hints = " u:upload  v:view  F:favorites  o:sign out ";
    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let available = area.width as usize;
    if available > used + hints.len() {
        spans.push(Span::raw(" ".repeat(available - used - hints.len())));
        spans.push(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.mode == AppMode::Searching;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Search ");

    input::render(
        frame,
        &app.search,
        block,
        area,
        focused,
        "Search your dog photos... (press /)",
    );
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let counts = &app.counts;
    let mut spans = Vec::new();

    for (tab, count) in counts.iter() {
        let is_selected = tab == app.filter.selected_category;
        let style = if is_selected {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let label = match tab {
            CategoryFilter::Favorites => format!(" ♥ {} ", tab.label()),
            _ => format!(" {} ", tab.label()),
        };
        spans.push(Span::styled(label, style));

        if count > 0 {
            spans.push(Span::styled(
                format!("{} ", count),
                if is_selected {
                    style
                } else {
                    Style::default().fg(Color::DarkGray)
                },
            ));
        }
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
