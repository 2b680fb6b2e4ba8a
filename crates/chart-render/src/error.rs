//! Error types for figure rendering.

use thiserror::Error;

/// Errors that can occur while building or exporting figures.
#[derive(Error, Debug)]
pub enum ChartError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The SVG could not be parsed back for rasterization.
    #[error("SVG error: {0}")]
    Svg(String),

    /// Rasterization failed.
    #[error("raster error: {0}")]
    Raster(String),

    /// Malformed style configuration.
    #[error("invalid style: {0}")]
    InvalidStyle(String),

    /// Chart input that cannot be drawn (empty series, bad domain).
    #[error("invalid chart input: {0}")]
    InvalidInput(String),
}

impl From<serde_yaml::Error> for ChartError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidStyle(err.to_string())
    }
}

/// Result type for figure rendering.
pub type Result<T> = std::result::Result<T, ChartError>;
