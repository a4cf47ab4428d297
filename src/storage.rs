//! Image storage collaborator.
//!
//! The gallery core treats `image_url` as an opaque string. This module is
//! the only place that knows how locators are produced and read back:
//!
//! - `file://` locators point at a content-addressed copy on local disk,
//! - `data:` locators carry the bytes inline,
//! - `http(s)://` locators are remote and never fetched.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;
use crate::intake::SelectedFile;

/// Turns image bytes into a durable locator.
pub trait ImageStore: Send + Sync {
    fn store(&self, file: &SelectedFile) -> Result<String, StorageError>;

    fn name(&self) -> &'static str;
}

/// Copies uploads into a directory, named by the SHA-256 of their contents.
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, file: &SelectedFile) -> PathBuf {
        let digest = format!("{:x}", Sha256::digest(&file.bytes));
        self.root.join(format!("{}.{}", digest, file.extension()))
    }
}

impl ImageStore for LocalImageStore {
    fn store(&self, file: &SelectedFile) -> Result<String, StorageError> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            path: self.root.clone(),
            source,
        })?;

        let path = self.path_for(file);
        if !path.exists() {
            // The final name only ever holds complete files.
            let partial = path.with_extension("partial");
            fs::write(&partial, &file.bytes)
                .and_then(|_| fs::rename(&partial, &path))
                .map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!("Stored {} at {:?}", file.name, path);
        }

        Ok(format!("file://{}", path.display()))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Keeps the bytes inside the locator itself as a `data:` URL.
#[derive(Debug, Default)]
pub struct InlineImageStore;

impl ImageStore for InlineImageStore {
    fn store(&self, file: &SelectedFile) -> Result<String, StorageError> {
        Ok(file.preview_data_url())
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}

pub fn from_config(config: &StorageConfig) -> Box<dyn ImageStore> {
    match config.backend {
        StorageBackend::Local => Box::new(LocalImageStore::new(config.path.clone())),
        StorageBackend::Inline => Box::new(InlineImageStore),
    }
}

/// A locator split by scheme.
#[derive(Debug, PartialEq, Eq)]
pub enum Locator<'a> {
    File(PathBuf),
    Data { mime: &'a str, payload: &'a str },
    Remote(&'a str),
}

impl<'a> Locator<'a> {
    pub fn parse(locator: &'a str) -> Result<Self, StorageError> {
        if let Some(path) = locator.strip_prefix("file://") {
            return Ok(Locator::File(PathBuf::from(path)));
        }
        if let Some(rest) = locator.strip_prefix("data:") {
            let (meta, payload) = rest.split_once(',').ok_or(StorageError::InvalidDataUrl)?;
            let mime = meta.strip_suffix(";base64").ok_or(StorageError::InvalidDataUrl)?;
            return Ok(Locator::Data { mime, payload });
        }
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return Ok(Locator::Remote(locator));
        }
        if locator.starts_with('/') {
            return Ok(Locator::File(PathBuf::from(locator)));
        }
        Err(StorageError::UnsupportedLocator(locator.to_string()))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Locator::Remote(_))
    }
}

/// Read the raw bytes behind a local or inline locator.
pub fn read_bytes(locator: &str) -> Result<Vec<u8>, StorageError> {
    match Locator::parse(locator)? {
        Locator::File(path) => fs::read(&path).map_err(|source| StorageError::Io { path, source }),
        Locator::Data { payload, .. } => STANDARD
            .decode(payload)
            .map_err(|_| StorageError::InvalidDataUrl),
        Locator::Remote(url) => Err(StorageError::UnsupportedLocator(url.to_string())),
    }
}

pub fn load_image(locator: &str) -> Result<DynamicImage, StorageError> {
    let bytes = read_bytes(locator)?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Save a copy of a photo's image into `dest_dir` as `<title>.<ext>`,
/// adding a counter when that name is taken. Returns the written path.
pub fn export_image(title: &str, locator: &str, dest_dir: &Path) -> Result<PathBuf, StorageError> {
    let bytes = read_bytes(locator)?;
    let extension = image::guess_format(&bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("jpg");

    fs::create_dir_all(dest_dir).map_err(|source| StorageError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let stem = sanitize_filename(title);
    let mut dest = dest_dir.join(format!("{}.{}", stem, extension));
    let mut counter = 1;
    while dest.exists() {
        dest = dest_dir.join(format!("{} ({}).{}", stem, counter, extension));
        counter += 1;
    }

    fs::write(&dest, &bytes).map_err(|source| StorageError::Io {
        path: dest.clone(),
        source,
    })?;
    Ok(dest)
}

fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.');
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned.to_string()
    }
}
