use thiserror::Error;

use guildkeep_platform::PlatformError;
use guildkeep_store::StoreError;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BackupError>;
