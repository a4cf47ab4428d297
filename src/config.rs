use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gallery::ViewMode;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Owner id stamped on every uploaded photo.
    #[serde(default = "default_user_id")]
    pub id: String,

    /// Email shown in the header. Without one, sign-in is unavailable.
    #[serde(default = "default_user_email")]
    pub email: Option<String>,

    /// Sign in automatically on startup.
    #[serde(default = "default_remember_session")]
    pub remember_session: bool,
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_user_email() -> Option<String> {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.is_empty())
        .map(|u| format!("{}@localhost", u))
}

fn default_remember_session() -> bool {
    true
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
            email: default_user_email(),
            remember_session: default_remember_session(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Copy uploads into `storage.path`.
    #[default]
    Local,
    /// Keep uploads in memory as data URLs.
    Inline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    Config::data_dir().join("images")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

fn default_max_size_bytes() -> u64 {
    10 * 1024 * 1024 // 10MB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageProtocol {
    /// Detect sixel/kitty/iTerm2/halfblocks support from the terminal.
    #[default]
    Auto,
    /// Text-only cards.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_enabled")]
    pub image_preview: bool,

    #[serde(default)]
    pub protocol: ImageProtocol,

    /// Longest edge, in pixels, of images decoded for the detail view.
    #[serde(default = "default_detail_size")]
    pub detail_size: u32,
}

fn default_preview_enabled() -> bool {
    true
}

fn default_detail_size() -> u32 {
    1024
}

impl PreviewConfig {
    pub fn enabled(&self) -> bool {
        self.image_preview && self.protocol != ImageProtocol::None
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            image_preview: default_preview_enabled(),
            protocol: ImageProtocol::default(),
            detail_size: default_detail_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Load the demo photos when a session starts.
    #[serde(default = "default_seed_demo_photos")]
    pub seed_demo_photos: bool,

    #[serde(default)]
    pub default_view: ViewMode,

    /// Where "Download" writes copies. Defaults to the user's download dir.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

fn default_seed_demo_photos() -> bool {
    true
}

impl GalleryConfig {
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            seed_demo_photos: default_seed_demo_photos(),
            default_view: ViewMode::default(),
            download_dir: None,
        }
    }
}

impl Config {
    /// Load from `DOGALLERY_CONFIG` or the default location, writing a
    /// default config there on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        match std::env::var_os("DOGALLERY_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir().join("config.toml"),
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dogallery")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join("dogallery")
    }

    pub fn log_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [user]
            email = "walker@example.com"

            [storage]
            backend = "inline"

            [gallery]
            default_view = "masonry"
            "#,
        )
        .unwrap();

        assert_eq!(config.user.id, "local");
        assert_eq!(config.user.email.as_deref(), Some("walker@example.com"));
        assert!(config.user.remember_session);
        assert_eq!(config.storage.backend, StorageBackend::Inline);
        assert_eq!(config.upload.max_size_bytes, 10 * 1024 * 1024);
        assert!(config.preview.enabled());
        assert!(config.gallery.seed_demo_photos);
        assert_eq!(config.gallery.default_view, ViewMode::Masonry);
    }

    #[test]
    fn test_protocol_none_disables_preview() {
        let config: Config = toml::from_str("[preview]\nprotocol = \"none\"\n").unwrap();
        assert!(!config.preview.enabled());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.user.email = Some("rex@example.com".to_string());
        config.upload.max_size_bytes = 1234;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.user.email.as_deref(), Some("rex@example.com"));
        assert_eq!(loaded.upload.max_size_bytes, 1234);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nbackend = \"s3\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
