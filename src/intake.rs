//! Upload intake: file selection, default titles and validation.
//!
//! The intake never touches the collection. It turns what the user picked
//! and typed into a [`PreparedUpload`], which the storage pipeline turns into
//! a locator and the shell finally hands to `add_photo`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::path::{Path, PathBuf};

use crate::error::IntakeError;
use crate::photo::{Category, NewPhoto};

/// An image file the user picked, read fully into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl SelectedFile {
    pub fn from_path(path: &Path, max_size: u64) -> Result<Self, IntakeError> {
        let io_err = |source| IntakeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > max_size {
            return Err(IntakeError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: max_size,
            });
        }

        let bytes = std::fs::read(path).map_err(io_err)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_bytes(path.to_path_buf(), name, bytes, max_size)
    }

    /// Validate in-memory bytes as an image of at most `max_size` bytes.
    pub fn from_bytes(
        path: PathBuf,
        name: String,
        bytes: Vec<u8>,
        max_size: u64,
    ) -> Result<Self, IntakeError> {
        let size = bytes.len() as u64;
        if size > max_size {
            return Err(IntakeError::TooLarge { path, size, max: max_size });
        }

        let format = match image::guess_format(&bytes) {
            Ok(format) => format,
            Err(_) => return Err(IntakeError::NotAnImage { path }),
        };

        Ok(Self { path, name, bytes, format })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Canonical file extension for the detected format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }

    /// `data:` URL holding the file contents.
    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

/// Title suggested for a file: extension stripped, first letter upper-cased.
pub fn default_title(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => &file_name[..idx],
        _ => file_name,
    };

    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn text pasted by a terminal drag-and-drop into a path.
///
/// Terminals quote paths containing spaces and some emit `file://` URLs.
pub fn normalize_dropped_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    let without_scheme = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    PathBuf::from(without_scheme.replace("\\ ", " "))
}

/// Fields ready for storage, after validation.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub file: SelectedFile,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
}

impl PreparedUpload {
    pub fn into_new_photo(self, image_url: String) -> NewPhoto {
        NewPhoto {
            title: self.title,
            description: self.description,
            image_url,
            category: self.category,
            is_favorite: false,
        }
    }
}

/// The upload form as the user is filling it in.
#[derive(Debug, Clone, Default)]
pub struct UploadDraft {
    pub file: Option<SelectedFile>,
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl UploadDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a validated file, filling in a title unless one was typed.
    pub fn select(&mut self, file: SelectedFile) {
        if self.title.trim().is_empty() {
            self.title = default_title(&file.name);
        }
        self.file = Some(file);
    }

    pub fn select_file(&mut self, path: &Path, max_size: u64) -> Result<(), IntakeError> {
        let file = SelectedFile::from_path(path, max_size)?;
        self.select(file);
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.title.trim().is_empty()
    }

    pub fn prepare(&self) -> Result<PreparedUpload, IntakeError> {
        let file = self.file.clone().ok_or(IntakeError::NoFileSelected)?;

        let title = self.title.trim();
        if title.is_empty() {
            return Err(IntakeError::MissingTitle);
        }

        let description = self.description.trim();
        Ok(PreparedUpload {
            file,
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            category: self.category,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
