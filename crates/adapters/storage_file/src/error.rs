//! Storage-specific error type wrapping file system and JSON errors.

use std::path::PathBuf;

use smarthub_domain::error::SmartHubError;

/// Errors originating from the flat-file storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing a file failed.
    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a value to JSON.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<StorageError> for SmartHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
