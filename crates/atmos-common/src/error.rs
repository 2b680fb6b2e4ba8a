//! Error types shared across the pipeline crates.

use thiserror::Error;

/// Errors raised by the shared conventions layer.
#[derive(Error, Debug)]
pub enum CommonError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A date string that does not parse as YYYY-MM-DD.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

impl From<serde_yaml::Error> for CommonError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Result type for shared-convention operations.
pub type Result<T> = std::result::Result<T, CommonError>;
