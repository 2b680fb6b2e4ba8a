//! Error types for gridded-field storage.

use thiserror::Error;

/// Errors that can occur while reading or writing gridded data.
#[derive(Error, Debug)]
pub enum GridStoreError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error.
    #[error("NetCDF error: {0}")]
    NetCdf(String),

    /// Missing required variable or dimension.
    #[error("missing required data: {0}")]
    MissingData(String),

    /// Malformed file contents.
    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    /// CSV parse or write error.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Excel workbook error.
    #[error("workbook error: {0}")]
    Workbook(String),
}

impl GridStoreError {
    /// Create a MissingData error.
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

impl From<netcdf::Error> for GridStoreError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCdf(err.to_string())
    }
}

impl From<csv::Error> for GridStoreError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<atmos_common::CommonError> for GridStoreError {
    fn from(err: atmos_common::CommonError) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

/// Result type for gridded-field storage operations.
pub type Result<T> = std::result::Result<T, GridStoreError>;
