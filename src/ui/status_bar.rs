use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::{App, AppMode};

pub fn render(frame: &mut Frame, app: &App, visible: usize, area: Rect) {
    // If there's a status message, show it prominently
    if let Some(ref message) = app.status_message {
        let line = Line::from(vec![Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        )]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let total = app.photos.len();
    let position = if visible > 0 {
        format!("{}/{}", app.gallery.selected + 1, visible)
    } else {
        "0/0".to_string()
    };

    // Build running task indicators
    let running_tasks = app.task_manager.running_tasks();
    let task_indicators: Vec<String> = running_tasks
        .iter()
        .map(|task| match task.progress {
            Some(ref progress) => format!("[{}:{}%]", task.task_type.short_name(), progress.percent()),
            None => format!("[{}:...]", task.task_type.short_name()),
        })
        .collect();

    let mut spans = vec![
        Span::styled(
            format!(" {} of {} photos ", visible, total),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::styled(
            format!(" {} ", app.filter.selected_category.label()),
            Style::default().fg(Color::Gray),
        ),
    ];

    if !task_indicators.is_empty() {
        spans.push(Span::styled(
            format!(" {} ", task_indicators.join(" ")),
            Style::default().fg(Color::Cyan),
        ));
    }

    let hints = match app.mode {
        AppMode::Searching => "Esc:done Ctrl+U:clear",
        _ if !running_tasks.is_empty() => "Esc:cancel ?:help q:quit",
        _ => "?:help q:quit",
    };
    let help_text = format!(" {} | {} ", position, hints);

    // Pad between the left content and the right-aligned hints
    let content_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let help_len = help_text.chars().count();
    let available = area.width as usize;
    if available > content_len + help_len {
        spans.push(Span::raw(" ".repeat(available - content_len - help_len)));
    }

    spans.push(Span::styled(
        help_text,
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
