use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::GalleryError;
use crate::gallery::{
    add_photo, compute_category_counts, delete_photo, derive_visible, find, toggle_favorite,
    CategoryCounts, FilterState,
};
use crate::photo::{Photo, PhotoId};
use crate::seed;
use crate::session::{AuthProvider, LocalAuth, User};
use crate::storage::{self, ImageStore};
use crate::tasks::{
    BackgroundTaskManager, TaskCompletionInfo, TaskOutcome, TaskProgress, TaskType, TaskUpdate,
};
use crate::ui;
use crate::ui::images::ImageCache;
use crate::ui::input::TextInput;
use crate::ui::gallery::GalleryView;
use crate::ui::upload_dialog::{UploadDialog, UploadField};
use crate::ui::{ConfirmDialog, DetailView, PendingAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Waiting for the auth provider to settle
    Loading,
    SignIn,
    Normal,
    Searching,
    Help,
    Viewing,
    Uploading,
    Confirming,
}

pub struct App {
    pub config: Config,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    auth: Box<dyn AuthProvider>,
    store: Arc<dyn ImageStore>,
    /// Signed-in user, mirrored from the auth provider each frame
    pub user: Option<User>,
    pub photos: Vec<Photo>,
    pub counts: CategoryCounts,
    pub filter: FilterState,
    pub search: TextInput,
    pub gallery: GalleryView,
    pub images: ImageCache,
    pub upload_dialog: UploadDialog,
    pub detail: Option<DetailView>,
    pub confirm_dialog: Option<ConfirmDialog>,
    pub sign_in_error: Option<String>,
    pub task_manager: BackgroundTaskManager,
    /// Bumped on every sign-in and sign-out
    session: u64,
    /// Session the running upload was started in
    upload_session: Option<u64>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let auth = Box::new(LocalAuth::new(config.user.clone()));
        let store: Arc<dyn ImageStore> = Arc::from(storage::from_config(&config.storage));
        let images = ImageCache::new(&config.preview);
        tracing::info!("Using {} image storage", store.name());
        Self::with_parts(config, auth, store, images)
    }

    pub fn with_parts(
        config: Config,
        auth: Box<dyn AuthProvider>,
        store: Arc<dyn ImageStore>,
        images: ImageCache,
    ) -> Self {
        let filter = FilterState {
            view_mode: config.gallery.default_view,
            ..FilterState::default()
        };

        Self {
            config,
            mode: AppMode::Loading,
            should_quit: false,
            status_message: None,
            auth,
            store,
            user: None,
            photos: Vec::new(),
            counts: CategoryCounts::default(),
            filter,
            search: TextInput::new(),
            gallery: GalleryView::new(),
            images,
            upload_dialog: UploadDialog::new(),
            detail: None,
            confirm_dialog: None,
            sign_in_error: None,
            task_manager: BackgroundTaskManager::new(),
            session: 0,
            upload_session: None,
        }
    }

    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            self.sync_session();
            self.poll_tasks();

            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
                    Event::Paste(text) => self.handle_paste(&text),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Mirror the auth provider: seed on sign-in, wipe on sign-out.
    pub fn sync_session(&mut self) {
        self.auth.refresh();
        let state = self.auth.state();

        if state.is_loading {
            self.mode = AppMode::Loading;
            return;
        }

        match (state.user, self.user.is_some()) {
            (Some(user), false) => {
                let photos = if self.config.gallery.seed_demo_photos {
                    seed::demo_photos(&user.id, Utc::now())
                } else {
                    Vec::new()
                };
                tracing::info!("Session started for {} with {} photos", user.email, photos.len());
                self.set_photos(photos);
                self.user = Some(user);
                self.session += 1;
                self.sign_in_error = None;
                self.mode = AppMode::Normal;
            }
            (None, true) => {
                if self.task_manager.cancel_type(TaskType::Upload) {
                    tracing::info!("Cancelling upload, session ended");
                }
                self.user = None;
                self.session += 1;
                self.set_photos(Vec::new());
                self.filter.clear();
                self.search.clear();
                self.gallery.move_to_start();
                self.detail = None;
                self.confirm_dialog = None;
                self.upload_dialog.reset();
                self.images.clear();
                self.mode = AppMode::SignIn;
            }
            (None, false) => self.mode = AppMode::SignIn,
            (Some(_), true) => {
                if self.mode == AppMode::Loading || self.mode == AppMode::SignIn {
                    self.mode = AppMode::Normal;
                }
            }
        }
    }

    fn set_photos(&mut self, photos: Vec<Photo>) {
        self.counts = compute_category_counts(&photos);
        self.photos = photos;
    }

    pub fn visible(&self) -> Vec<&Photo> {
        derive_visible(&self.photos, &self.filter)
    }

    pub fn selected_photo(&self) -> Option<&Photo> {
        self.visible().get(self.gallery.selected).copied()
    }

    fn report(&mut self, error: GalleryError) {
        tracing::warn!("{}", error);
        self.status_message = Some(error.to_string());
    }

    /// Apply finished background work. Only the UI thread mutates the
    /// collection.
    pub fn poll_tasks(&mut self) {
        for completion in self.task_manager.poll_updates() {
            self.handle_completion(completion);
        }
    }

    fn handle_completion(&mut self, completion: TaskCompletionInfo) {
        let prefix = completion.task_type.display_name();

        // At most one upload runs, so the stamp belongs to this completion.
        if completion.task_type == TaskType::Upload
            && self.upload_session.take() != Some(self.session)
        {
            tracing::warn!("Discarding upload from an ended session: {}", completion.message);
            return;
        }

        if !completion.success {
            tracing::error!("{} failed: {}", prefix, completion.message);
            if completion.task_type == TaskType::Upload {
                self.upload_dialog.is_uploading = false;
                self.upload_dialog.error = Some(completion.message.clone());
            }
            self.status_message = Some(format!("{} failed: {}", prefix, completion.message));
            return;
        }

        match completion.outcome {
            Some(TaskOutcome::Uploaded(new_photo)) if completion.cancel_requested => {
                tracing::info!("Upload of {:?} cancelled after storing", new_photo.title);
                self.upload_dialog.is_uploading = false;
                self.status_message = Some("Upload cancelled".to_string());
            }
            Some(TaskOutcome::Uploaded(new_photo)) => {
                let Some(owner) = self.user.as_ref().map(|u| u.id.clone()) else {
                    tracing::warn!("Dropping upload of {:?}, session ended", new_photo.title);
                    return;
                };
                let (photos, id) = add_photo(&self.photos, new_photo, &owner, Utc::now());
                tracing::info!("Added photo {}", id);
                self.set_photos(photos);

                self.upload_dialog.reset();
                self.images.forget_previews();
                if self.mode == AppMode::Uploading {
                    self.mode = AppMode::Normal;
                }
                let position = self.visible().iter().position(|p| p.id == id);
                if let Some(idx) = position {
                    self.gallery.selected = idx;
                }
                self.status_message = Some(completion.message);
            }
            None => {
                tracing::info!("{}: {}", prefix, completion.message);
                self.status_message = Some(format!("{}: {}", prefix, completion.message));
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.mode != AppMode::Uploading {
            self.status_message = None;
        }

        match self.mode {
            AppMode::Loading => {
                if key.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppMode::SignIn => self.handle_sign_in_key(key),
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Searching => self.handle_search_key(key),
            AppMode::Help => self.mode = AppMode::Normal,
            AppMode::Viewing => self.handle_detail_key(key),
            AppMode::Uploading => self.handle_upload_key(key),
            AppMode::Confirming => self.handle_confirm_key(key),
        }
    }

    fn handle_sign_in_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => match self.auth.login() {
                Ok(()) => self.sync_session(),
                Err(e) => {
                    self.sign_in_error = Some(e.to_string());
                    self.report(e.into());
                }
            },
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let len = self.visible().len();
        let columns = self.gallery.last_columns.max(1);
        let rows = self.gallery.last_rows.max(1);

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Esc => {
                if self.task_manager.cancel_most_recent() {
                    self.status_message = Some("Cancelling task...".to_string());
                }
            }

            // Filtering
            KeyCode::Char('/') => self.mode = AppMode::Searching,
            KeyCode::Tab | KeyCode::Char(']') => self.cycle_category(true),
            KeyCode::BackTab | KeyCode::Char('[') => self.cycle_category(false),
            KeyCode::Char('F') => {
                self.filter.toggle_favorites_only();
                self.gallery.move_to_start();
            }
            KeyCode::Char('v') => self.filter.toggle_view_mode(),
            KeyCode::Char('c') => {
                self.filter.clear();
                self.search.clear();
                self.gallery.move_to_start();
            }

            // Navigation
            KeyCode::Left | KeyCode::Char('h') => self.gallery.move_left(),
            KeyCode::Right | KeyCode::Char('l') => self.gallery.move_right(len),
            KeyCode::Up | KeyCode::Char('k') => self.gallery.move_up(columns),
            KeyCode::Down | KeyCode::Char('j') => self.gallery.move_down(columns, len),
            KeyCode::Char('g') | KeyCode::Home => self.gallery.move_to_start(),
            KeyCode::Char('G') | KeyCode::End => self.gallery.move_to_end(len),
            KeyCode::PageUp => self.gallery.page_up(columns, rows),
            KeyCode::PageDown => self.gallery.page_down(columns, rows, len),
            KeyCode::Char('+') | KeyCode::Char('=') => self.gallery.increase_size(),
            KeyCode::Char('-') => self.gallery.decrease_size(),

            // Photo actions
            KeyCode::Char('f') => self.toggle_selected_favorite(),
            KeyCode::Char('d') | KeyCode::Delete => self.confirm_delete_selected(),
            KeyCode::Enter => {
                if let Some(id) = self.selected_photo().map(|p| p.id.clone()) {
                    self.detail = Some(DetailView::new(id));
                    self.mode = AppMode::Viewing;
                }
            }
            KeyCode::Char('u') => self.open_upload(),
            KeyCode::Char('o') => {
                self.auth.logout();
                self.sync_session();
            }
            _ => {}
        }
    }

    fn cycle_category(&mut self, forward: bool) {
        self.filter.cycle_category(forward);
        self.gallery.move_to_start();
    }

    fn sync_search_query(&mut self) {
        if self.filter.search_query != self.search.text() {
            self.filter.search_query = self.search.text().to_string();
            self.gallery.move_to_start();
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => self.mode = AppMode::Normal,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.search.clear(),
            KeyCode::Char(c) => self.search.handle_char(c),
            KeyCode::Backspace => self.search.backspace(),
            KeyCode::Delete => self.search.delete(),
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Home => self.search.move_cursor_home(),
            KeyCode::End => self.search.move_cursor_end(),
            _ => {}
        }
        self.sync_search_query();
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(id) = self.detail.as_ref().map(|d| d.photo_id.clone()) else {
            self.mode = AppMode::Normal;
            return;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
                self.detail = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Char('f') => self.set_photos(toggle_favorite(&self.photos, &id)),
            KeyCode::Char('s') => self.start_download(&id),
            KeyCode::Char('d') => {
                if let Some(photo) = find(&self.photos, &id) {
                    self.confirm_dialog = Some(ConfirmDialog::delete(photo));
                    self.mode = AppMode::Confirming;
                }
            }
            _ => {}
        }
    }

    fn toggle_selected_favorite(&mut self) {
        if let Some(id) = self.selected_photo().map(|p| p.id.clone()) {
            self.set_photos(toggle_favorite(&self.photos, &id));
        }
    }

    fn confirm_delete_selected(&mut self) {
        if let Some(dialog) = self.selected_photo().map(ConfirmDialog::delete) {
            self.confirm_dialog = Some(dialog);
            self.mode = AppMode::Confirming;
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                if let Some(dialog) = self.confirm_dialog.take() {
                    match dialog.action {
                        PendingAction::Delete(id) => self.delete(&id),
                    }
                }
                self.detail = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.confirm_dialog = None;
                self.mode = if self.detail.is_some() {
                    AppMode::Viewing
                } else {
                    AppMode::Normal
                };
            }
            _ => {}
        }
    }

    fn delete(&mut self, id: &PhotoId) {
        if let Some(photo) = find(&self.photos, id) {
            tracing::info!("Deleting photo {} ({:?})", id, photo.title);
            self.status_message = Some(format!("Deleted \"{}\"", photo.title));
        }
        self.set_photos(delete_photo(&self.photos, id));
        self.images.forget(id);
        let len = self.visible().len();
        self.gallery.clamp(len);
    }

    fn open_upload(&mut self) {
        self.mode = AppMode::Uploading;
    }

    fn handle_upload_key(&mut self, key: KeyEvent) {
        let dialog = &mut self.upload_dialog;

        if key.code == KeyCode::Esc {
            if dialog.is_uploading {
                if self.task_manager.cancel_type(TaskType::Upload) {
                    self.status_message = Some("Cancelling upload...".to_string());
                }
            } else {
                dialog.reset();
                self.images.forget_previews();
                self.mode = AppMode::Normal;
            }
            return;
        }

        if dialog.is_uploading {
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => dialog.focus_next(),
            KeyCode::BackTab | KeyCode::Up => dialog.focus_prev(),
            KeyCode::Enter => match dialog.focus {
                UploadField::File => {
                    if dialog.select_from_input(self.config.upload.max_size_bytes).is_ok() {
                        dialog.focus = UploadField::Title;
                    }
                }
                UploadField::Submit => self.submit_upload(),
                _ => dialog.focus_next(),
            },
            KeyCode::Left if dialog.focus == UploadField::Category => dialog.cycle_category(false),
            KeyCode::Right | KeyCode::Char(' ') if dialog.focus == UploadField::Category => {
                dialog.cycle_category(true)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if dialog.focus == UploadField::File {
                    dialog.clear_file();
                    self.images.forget_previews();
                } else if let Some(input) = dialog.focused_input() {
                    input.clear();
                }
            }
            code => {
                if let Some(input) = dialog.focused_input() {
                    match code {
                        KeyCode::Char(c) => input.handle_char(c),
                        KeyCode::Backspace => input.backspace(),
                        KeyCode::Delete => input.delete(),
                        KeyCode::Left => input.move_cursor_left(),
                        KeyCode::Right => input.move_cursor_right(),
                        KeyCode::Home => input.move_cursor_home(),
                        KeyCode::End => input.move_cursor_end(),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Validate the form and store the image on a worker thread. The photo
    /// is added when the task reports back.
    pub fn submit_upload(&mut self) {
        if self.task_manager.is_running(TaskType::Upload) {
            self.status_message = Some("Upload already in progress".to_string());
            return;
        }
        if self.user.is_none() {
            self.report(GalleryError::NotSignedIn);
            return;
        }

        let prepared = match self.upload_dialog.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                self.report(e.into());
                return;
            }
        };

        let (_task_id, tx, cancel_flag) = self.task_manager.register_task(TaskType::Upload);
        self.upload_session = Some(self.session);
        let store = Arc::clone(&self.store);
        self.upload_dialog.is_uploading = true;
        self.upload_dialog.error = None;
        tracing::info!("Uploading {:?} as {:?}", prepared.file.path, prepared.title);

        std::thread::spawn(move || {
            let _ = tx.send(TaskUpdate::Started { total: 1 });

            let locator = match store.store(&prepared.file) {
                Ok(locator) => locator,
                Err(e) => {
                    let _ = tx.send(TaskUpdate::Failed { error: e.to_string() });
                    return;
                }
            };

            if cancel_flag.load(Ordering::SeqCst) {
                let _ = tx.send(TaskUpdate::Cancelled);
                return;
            }

            let _ = tx.send(TaskUpdate::Progress(
                TaskProgress::new(1, 1).with_item(prepared.file.name.clone()),
            ));
            let message = format!("Uploaded \"{}\"", prepared.title);
            let _ = tx.send(TaskUpdate::Completed {
                message,
                outcome: Some(TaskOutcome::Uploaded(prepared.into_new_photo(locator))),
            });
        });
    }

    /// Save a copy of the photo into the download directory.
    fn start_download(&mut self, id: &PhotoId) {
        let Some(photo) = find(&self.photos, id) else {
            return;
        };

        let (_task_id, tx, _cancel_flag) = self.task_manager.register_task(TaskType::Download);
        let title = photo.title.clone();
        let locator = photo.image_url.clone();
        let dest_dir = self.config.gallery.download_dir();
        self.status_message = Some(format!("Downloading \"{}\"...", title));

        std::thread::spawn(move || {
            let _ = tx.send(TaskUpdate::Started { total: 1 });
            match storage::export_image(&title, &locator, &dest_dir) {
                Ok(path) => {
                    let _ = tx.send(TaskUpdate::Completed {
                        message: format!("Saved {}", path.display()),
                        outcome: None,
                    });
                }
                Err(e) => {
                    let _ = tx.send(TaskUpdate::Failed { error: e.to_string() });
                }
            }
        });
    }

    fn handle_paste(&mut self, text: &str) {
        let max_size = self.config.upload.max_size_bytes;
        match self.mode {
            AppMode::Searching => {
                self.search.insert_str(text);
                self.sync_search_query();
            }
            AppMode::Uploading if !self.upload_dialog.is_uploading => {
                self.upload_dialog.paste(text, max_size);
            }
            // Dropping a file on the gallery starts an upload with it
            AppMode::Normal => {
                self.upload_dialog.focus = UploadField::File;
                self.upload_dialog.paste(text, max_size);
                if self.upload_dialog.has_file() {
                    self.upload_dialog.focus = UploadField::Title;
                }
                self.mode = AppMode::Uploading;
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != AppMode::Normal {
            return;
        }
        let columns = self.gallery.last_columns.max(1);
        let len = self.visible().len();
        match mouse.kind {
            MouseEventKind::ScrollDown => self.gallery.move_down(columns, len),
            MouseEventKind::ScrollUp => self.gallery.move_up(columns),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use crate::photo::{Category, CategoryFilter};
    use crate::error::{SessionError, StorageError};
    use crate::intake::SelectedFile;
    use crate::storage::InlineImageStore;
    use image::ImageFormat;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    /// Inline storage that takes a while, so the session can change meanwhile.
    struct SlowStore;

    impl ImageStore for SlowStore {
        fn store(&self, file: &SelectedFile) -> Result<String, StorageError> {
            std::thread::sleep(Duration::from_millis(300));
            InlineImageStore.store(file)
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(key(code));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn signed_in_app() -> App {
        signed_in_app_with(Arc::new(InlineImageStore))
    }

    fn signed_in_app_with(store: Arc<dyn ImageStore>) -> App {
        let user = UserConfig {
            id: "owner-1".to_string(),
            email: Some("walker@example.com".to_string()),
            remember_session: true,
        };
        let mut config = Config::default();
        config.gallery.seed_demo_photos = true;
        let mut app = App::with_parts(
            config,
            Box::new(LocalAuth::new(user)),
            store,
            ImageCache::with_picker(None, 256),
        );
        app.sync_session();
        app
    }

    fn visible_ids(app: &App) -> Vec<String> {
        app.visible().iter().map(|p| p.id.to_string()).collect()
    }

    fn wait_for_tasks(app: &mut App) {
        for _ in 0..500 {
            app.poll_tasks();
            if !app.task_manager.has_running_tasks() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("background task did not finish");
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(3, 3));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        std::fs::write(&path, buf).unwrap();
        path
    }

    fn start_upload(app: &mut App, path: &Path) {
        app.handle_paste(&path.display().to_string());
        app.upload_dialog.focus = UploadField::Submit;
        press(app, KeyCode::Enter);
        assert!(app.upload_dialog.is_uploading);
    }

    #[test]
    fn test_sign_in_seeds_demo_photos() {
        let app = signed_in_app();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.photos.len(), 4);
        assert_eq!(app.counts.all, 4);
        assert_eq!(app.counts.favorites, 2);
        assert!(app.photos.iter().all(|p| p.owner_id.as_str() == "owner-1"));
    }

    #[test]
    fn test_filter_keys() {
        let mut app = signed_in_app();

        press(&mut app, KeyCode::Char('F'));
        assert_eq!(visible_ids(&app), vec!["1", "3"]);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.filter.selected_category, CategoryFilter::Category(Category::Puppy));
        assert_eq!(visible_ids(&app), vec!["1"]);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(visible_ids(&app).len(), 4);
    }

    #[test]
    fn test_search_updates_live() {
        let mut app = signed_in_app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, AppMode::Searching);

        type_text(&mut app, "border");
        assert_eq!(visible_ids(&app), vec!["2"]);

        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(app.filter.search_query.is_empty());
        assert_eq!(visible_ids(&app).len(), 4);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_favorite_and_delete_selected() {
        let mut app = signed_in_app();
        let first = app.selected_photo().unwrap().clone();

        press(&mut app, KeyCode::Char('f'));
        assert_ne!(app.selected_photo().unwrap().is_favorite, first.is_favorite);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, AppMode::Confirming);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.photos.len(), 4);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.photos.len(), 3);
        assert!(find(&app.photos, &first.id).is_none());
        assert_eq!(app.counts.all, 3);
    }

    #[test]
    fn test_detail_view_toggles_favorite() {
        let mut app = signed_in_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Viewing);

        let id = app.detail.as_ref().unwrap().photo_id.clone();
        let before = find(&app.photos, &id).unwrap().is_favorite;
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(find(&app.photos, &id).unwrap().is_favorite, !before);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_sign_out_clears_collection_and_filters() {
        let mut app = signed_in_app();
        press(&mut app, KeyCode::Char('F'));
        press(&mut app, KeyCode::Char('o'));

        assert_eq!(app.mode, AppMode::SignIn);
        assert!(app.photos.is_empty());
        assert!(!app.filter.is_active());
        assert!(app.user.is_none());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.photos.len(), 4);
    }

    #[test]
    fn test_upload_adds_photo_on_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "sunny_day.png");

        let mut app = signed_in_app();
        app.handle_paste(&path.display().to_string());
        assert_eq!(app.mode, AppMode::Uploading);
        assert_eq!(app.upload_dialog.title.text(), "Sunny_day");

        app.upload_dialog.focus = UploadField::Submit;
        press(&mut app, KeyCode::Enter);
        assert!(app.upload_dialog.is_uploading);
        assert_eq!(app.photos.len(), 4);

        app.submit_upload();
        assert_eq!(app.status_message.as_deref(), Some("Upload already in progress"));

        wait_for_tasks(&mut app);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.photos.len(), 5);

        let added = &app.photos[0];
        assert_eq!(added.title, "Sunny_day");
        assert_eq!(added.owner_id.as_str(), "owner-1");
        assert!(!added.is_favorite);
        assert!(added.image_url.starts_with("data:image/png;base64,"));
        assert!(!app.upload_dialog.has_file());
    }

    #[test]
    fn test_upload_from_ended_session_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "ghost.png");

        let mut app = signed_in_app_with(Arc::new(SlowStore));
        start_upload(&mut app, &path);

        // Session ends underneath the running upload
        app.auth.logout();
        app.sync_session();
        assert_eq!(app.mode, AppMode::SignIn);
        assert!(app.photos.is_empty());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.photos.len(), 4);

        wait_for_tasks(&mut app);
        assert_eq!(app.photos.len(), 4);
        assert!(app.photos.iter().all(|p| p.title != "Ghost"));
        assert!(!app.upload_dialog.is_uploading);
        assert!(app.upload_dialog.error.is_none());
    }

    #[test]
    fn test_cancel_after_store_keeps_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "late.png");

        let mut app = signed_in_app();
        start_upload(&mut app, &path);

        // The worker finishes before the cancel is seen
        std::thread::sleep(Duration::from_millis(200));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.status_message.as_deref(), Some("Cancelling upload..."));

        wait_for_tasks(&mut app);
        assert_eq!(app.photos.len(), 4);
        assert_eq!(app.status_message.as_deref(), Some("Upload cancelled"));
        assert!(!app.upload_dialog.is_uploading);
        assert_eq!(app.mode, AppMode::Uploading);
    }

    #[test]
    fn test_sign_in_without_email_reports_error() {
        let user = UserConfig {
            id: "owner-1".to_string(),
            email: None,
            remember_session: false,
        };
        let mut app = App::with_parts(
            Config::default(),
            Box::new(LocalAuth::new(user)),
            Arc::new(InlineImageStore),
            ImageCache::with_picker(None, 256),
        );
        app.sync_session();
        assert_eq!(app.mode, AppMode::SignIn);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::SignIn);
        let message = SessionError::NotConfigured.to_string();
        assert_eq!(app.sign_in_error.as_deref(), Some(message.as_str()));
        assert_eq!(app.status_message.as_deref(), Some(message.as_str()));
    }

    #[test]
    fn test_upload_without_file_is_rejected() {
        let mut app = signed_in_app();
        press(&mut app, KeyCode::Char('u'));
        app.upload_dialog.title.set_text("Nameless");
        app.submit_upload();

        assert!(!app.task_manager.has_running_tasks());
        assert_eq!(app.status_message.as_deref(), Some("Select a photo to upload"));
        assert_eq!(app.photos.len(), 4);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_download_of_remote_photo_fails_cleanly() {
        let mut app = signed_in_app();
        let id = app.photos[0].id.clone();
        app.start_download(&id);
        wait_for_tasks(&mut app);

        let message = app.status_message.clone().unwrap();
        assert!(message.starts_with("Download failed"));
        assert_eq!(app.photos.len(), 4);
    }
}
