use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error while reading or writing backup files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized or parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A relative path tried to leave the backup root.
    #[error("Invalid backup path: {0}")]
    InvalidPath(String),

    /// A record file that should exist is missing.
    #[error("Missing backup file: {0}")]
    Missing(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
