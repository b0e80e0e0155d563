//! Error handling module for the highlight pipeline

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for application-level operations
#[derive(Error, Debug)]
pub enum HighlightError {
    /// Failure reported by a port or core component
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Saved plan or report could not be read
    #[error("Invalid plan file {path}: {message}")]
    InvalidPlan { path: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for application-level operations
pub type HighlightResult<T> = std::result::Result<T, HighlightError>;
