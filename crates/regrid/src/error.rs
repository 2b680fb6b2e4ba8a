//! Error types for grid resampling.

use thiserror::Error;

/// Errors that can occur while resampling grids.
#[derive(Error, Debug)]
pub enum RegridError {
    /// Data length does not match the stated grid shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A coordinate axis is unusable (empty or non-monotonic).
    #[error("invalid axis: {0}")]
    InvalidAxis(String),

    /// The scattered input is empty.
    #[error("no input points: {0}")]
    EmptyInput(String),
}

impl RegridError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create an InvalidAxis error.
    pub fn invalid_axis(msg: impl Into<String>) -> Self {
        Self::InvalidAxis(msg.into())
    }
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, RegridError>;
