use thiserror::Error;

/// Failure to read a platform identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnowflakeError {
    #[error("Empty snowflake")]
    Empty,

    #[error("Invalid snowflake: {0}")]
    Invalid(String),
}
