use thiserror::Error;

/// Errors produced while talking to the chat platform or its CDN.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {path} answered {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("Rate limited on {path} after {attempts} attempts")]
    RateLimited { path: String, attempts: u32 },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
