//! Error types for the numeric kernels.

use thiserror::Error;

/// Errors raised by the numeric kernels.
///
/// These cover structural problems only (mismatched shapes, unsolvable
/// fits); numeric edge cases produce sentinel values instead.
#[derive(Error, Debug)]
pub enum KernelError {
    /// Input arrays disagree on shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Not enough data for the requested fit.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The least-squares system could not be solved.
    #[error("fit failed: {0}")]
    FitFailed(String),
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
