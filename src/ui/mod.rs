mod confirm_dialog;
mod detail;
mod dialogs;
pub mod gallery;
pub mod images;
pub mod input;
mod sign_in;
mod status_bar;
mod toolbar;
pub mod upload_dialog;

pub use confirm_dialog::{ConfirmDialog, PendingAction};
pub use detail::DetailView;

use ratatui::prelude::*;

use crate::app::{App, AppMode};
use crate::gallery::{derive_visible, find};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    match app.mode {
        AppMode::Loading => {
            sign_in::render_loading(frame, area);
            return;
        }
        AppMode::SignIn => {
            sign_in::render(frame, app.sign_in_error.as_deref(), area);
            return;
        }
        _ => {}
    }

    app.images.poll();

    // Header, search, tabs, grid, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    toolbar::render_header(frame, app, chunks[0]);
    toolbar::render_search(frame, app, chunks[1]);
    toolbar::render_tabs(frame, app, chunks[2]);

    let visible = derive_visible(&app.photos, &app.filter);
    gallery::render(
        frame,
        &mut app.gallery,
        &mut app.images,
        &visible,
        app.filter.view_mode,
        app.filter.is_active(),
        chunks[3],
    );
    status_bar::render(frame, app, visible.len(), chunks[4]);

    match app.mode {
        AppMode::Help => dialogs::render_help(frame, area),
        AppMode::Viewing => {
            if let Some(photo) = app.detail.as_ref().and_then(|d| find(&app.photos, &d.photo_id)) {
                detail::render(frame, photo, &mut app.images, area);
            }
        }
        AppMode::Uploading => upload_dialog::render(frame, &app.upload_dialog, &mut app.images, area),
        AppMode::Confirming => {
            if let Some(ref dialog) = app.confirm_dialog {
                confirm_dialog::render(frame, dialog, area);
            }
        }
        _ => {}
    }
}
