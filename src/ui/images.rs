//! Decoded image cache for cards, the detail view and the upload preview.
//!
//! Decoding happens on short-lived threads. Results arrive over a channel
//! and are turned into terminal graphics protocols on the UI thread, since
//! the picker is not shared across threads.

use image::{imageops::FilterType, DynamicImage};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

use crate::config::PreviewConfig;
use crate::photo::PhotoId;
use crate::storage::{self, Locator};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageKey {
    Thumbnail(PhotoId),
    Full(PhotoId),
    /// Upload preview, keyed by a generation counter bumped on each selection.
    UploadPreview(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Ready,
    Loading,
    Unavailable,
}

enum Source {
    Locator(String),
    Bytes(Vec<u8>),
}

pub struct ImageCache {
    picker: Option<Picker>,
    cache: HashMap<ImageKey, StatefulProtocol>,
    loading: HashSet<ImageKey>,
    failed: HashSet<ImageKey>,
    sender: mpsc::Sender<(ImageKey, Option<DynamicImage>)>,
    receiver: mpsc::Receiver<(ImageKey, Option<DynamicImage>)>,
    thumbnail_size: u32,
    detail_size: u32,
}

impl ImageCache {
    pub fn new(config: &PreviewConfig) -> Self {
        let picker = if config.enabled() {
            Picker::from_query_stdio().ok()
        } else {
            None
        };
        if picker.is_none() {
            tracing::info!("Image previews disabled");
        }
        Self::with_picker(picker, config.detail_size)
    }

    pub fn with_picker(picker: Option<Picker>, detail_size: u32) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            picker,
            cache: HashMap::new(),
            loading: HashSet::new(),
            failed: HashSet::new(),
            sender,
            receiver,
            thumbnail_size: 256,
            detail_size,
        }
    }

    pub fn is_available(&self) -> bool {
        self.picker.is_some()
    }

    pub fn set_thumbnail_size(&mut self, size: u32) {
        if size != self.thumbnail_size {
            self.thumbnail_size = size;
            self.cache.retain(|key, _| !matches!(key, ImageKey::Thumbnail(_)));
        }
    }

    /// Drain finished decodes. Call once per frame.
    pub fn poll(&mut self) {
        while let Ok((key, image)) = self.receiver.try_recv() {
            // Forgotten while decoding
            if !self.loading.remove(&key) {
                continue;
            }
            match (image, self.picker.as_mut()) {
                (Some(image), Some(picker)) => {
                    let protocol = picker.new_resize_protocol(image);
                    self.cache.insert(key, protocol);
                }
                _ => {
                    self.failed.insert(key);
                }
            }
        }
    }

    /// Status of the image behind `locator`, starting a decode if needed.
    pub fn request(&mut self, key: &ImageKey, locator: &str) -> ImageStatus {
        if self.cache.contains_key(key) {
            return ImageStatus::Ready;
        }
        if matches!(Locator::parse(locator), Ok(l) if l.is_remote()) {
            self.failed.insert(key.clone());
            return ImageStatus::Unavailable;
        }
        if self.picker.is_none() || self.failed.contains(key) {
            return ImageStatus::Unavailable;
        }
        self.spawn(key, Source::Locator(locator.to_string()));
        ImageStatus::Loading
    }

    /// Same as [`request`](Self::request) for bytes that are not stored yet.
    pub fn request_bytes(&mut self, key: &ImageKey, bytes: &[u8]) -> ImageStatus {
        if self.cache.contains_key(key) {
            return ImageStatus::Ready;
        }
        if self.picker.is_none() || self.failed.contains(key) {
            return ImageStatus::Unavailable;
        }
        self.spawn(key, Source::Bytes(bytes.to_vec()));
        ImageStatus::Loading
    }

    pub fn get_mut(&mut self, key: &ImageKey) -> Option<&mut StatefulProtocol> {
        self.cache.get_mut(key)
    }

    /// Drop everything cached for a photo.
    pub fn forget(&mut self, id: &PhotoId) {
        let matches = |key: &ImageKey| match key {
            ImageKey::Thumbnail(k) | ImageKey::Full(k) => k == id,
            ImageKey::UploadPreview(_) => false,
        };
        self.cache.retain(|key, _| !matches(key));
        self.loading.retain(|key| !matches(key));
        self.failed.retain(|key| !matches(key));
    }

    pub fn forget_previews(&mut self) {
        self.cache.retain(|key, _| !matches!(key, ImageKey::UploadPreview(_)));
        self.loading.retain(|key| !matches!(key, ImageKey::UploadPreview(_)));
        self.failed.retain(|key| !matches!(key, ImageKey::UploadPreview(_)));
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.loading.clear();
        self.failed.clear();
    }

    fn spawn(&mut self, key: &ImageKey, source: Source) {
        if !self.loading.insert(key.clone()) {
            return;
        }

        let size = match key {
            ImageKey::Thumbnail(_) => self.thumbnail_size,
            ImageKey::Full(_) | ImageKey::UploadPreview(_) => self.detail_size,
        };
        let key = key.clone();
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            let decoded = match source {
                Source::Locator(locator) => storage::load_image(&locator),
                Source::Bytes(bytes) => image::load_from_memory(&bytes).map_err(Into::into),
            };
            let image = match decoded {
                Ok(img) => Some(img.resize(size, size, FilterType::Triangle)),
                Err(e) => {
                    tracing::warn!("Failed to load image for {:?}: {}", key, e);
                    None
                }
            };
            let _ = sender.send((key, image));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_picker_everything_is_unavailable() {
        let mut cache = ImageCache::with_picker(None, 512);
        assert!(!cache.is_available());

        let key = ImageKey::Thumbnail(PhotoId::new("1"));
        assert_eq!(cache.request(&key, "file:///tmp/none.png"), ImageStatus::Unavailable);
        assert_eq!(cache.request_bytes(&ImageKey::UploadPreview(1), b"abc"), ImageStatus::Unavailable);
        assert!(cache.get_mut(&key).is_none());
    }

    #[test]
    fn test_remote_locators_are_never_fetched() {
        let mut cache = ImageCache::with_picker(None, 512);
        let key = ImageKey::Full(PhotoId::new("1"));
        assert_eq!(
            cache.request(&key, "https://images.unsplash.com/photo.jpg"),
            ImageStatus::Unavailable
        );
        assert!(cache.failed.contains(&key));

        cache.forget(&PhotoId::new("1"));
        assert!(!cache.failed.contains(&key));
    }

    #[test]
    fn test_decode_finishing_after_forget_is_dropped() {
        let mut cache = ImageCache::with_picker(None, 512);
        let kept = ImageKey::Thumbnail(PhotoId::new("1"));
        let gone = ImageKey::Thumbnail(PhotoId::new("2"));
        cache.loading.insert(kept.clone());
        cache.loading.insert(gone.clone());

        cache.forget(&PhotoId::new("2"));
        assert!(!cache.loading.contains(&gone));

        cache.sender.send((kept.clone(), None)).unwrap();
        cache.sender.send((gone.clone(), None)).unwrap();
        cache.poll();
        assert!(cache.failed.contains(&kept));
        assert!(!cache.failed.contains(&gone));
        assert!(cache.loading.is_empty());

        cache.loading.insert(gone.clone());
        cache.clear();
        cache.sender.send((gone.clone(), None)).unwrap();
        cache.poll();
        assert!(cache.failed.is_empty());
    }
}
