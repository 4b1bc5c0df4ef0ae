//! Error types for the geostage library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for archive and scene operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Document cannot be decoded into an archive
    #[error("Invalid archive document: {0}")]
    InvalidDocument(String),

    /// Property not found by name
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    /// Object not found by name or path
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Type mismatch when reading data
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Sample index out of bounds
    #[error("Sample index {index} out of bounds (count: {count})")]
    SampleOutOfBounds { index: usize, count: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid document error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }
}

/// Result type alias for geostage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::invalid("bad sampling index");
        assert!(e.to_string().contains("bad sampling index"));

        let e = Error::SampleOutOfBounds { index: 5, count: 3 };
        assert!(e.to_string().contains("5"));
        assert!(e.to_string().contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
