//! Error types for the sift application layer.

use sift_search::SearchError;

/// Top-level error type for the sift application.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// Configuration file could not be parsed, written, or validated.
    #[error("config error: {0}")]
    Config(String),

    /// Fixture file could not be parsed or describes an invalid backend.
    #[error("fixture error: {0}")]
    Fixture(String),

    /// Error from the search core.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SiftError>;
