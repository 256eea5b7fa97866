//! Error handling for the tracker pipeline.

use std::io;
use std::path::Path;

use arrow::error::ArrowError;
use thiserror::Error;

/// Specialized error type for tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Error in the global configuration
    #[error("Config error: {0}")]
    Config(String),
    /// A table is missing an expected column or has an unexpected layout
    #[error("Schema error: {0}")]
    Schema(String),
    /// A value does not have the expected shape (e.g. a malformed identifier)
    #[error("Data format error: {0}")]
    Format(String),
}

impl TrackerError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a data-format error
    pub fn format_err(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a file-not-found error for the given path
    pub fn file_not_found(path: &Path) -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        ))
    }
}

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
