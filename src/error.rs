use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

/// Reasons an upload is rejected before it reaches storage.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Select a photo to upload")]
    NoFileSelected,

    #[error("Give your photo a title")]
    MissingTitle,

    #[error("{} is not an image", path.display())]
    NotAnImage { path: PathBuf },

    #[error("{} is too large ({size} bytes, limit {max})", path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the image storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image locator: {0}")]
    UnsupportedLocator(String),

    #[error("Malformed data URL")]
    InvalidDataUrl,

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No user configured; set [user] email in the config file")]
    NotConfigured,
}

/// Errors the UI thread reports back to the user. Storage failures happen on
/// workers and arrive as task messages instead.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Not signed in")]
    NotSignedIn,
}
