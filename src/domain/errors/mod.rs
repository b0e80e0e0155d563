// Domain errors - Error types for the domain layer

use serde::Serialize;
use thiserror::Error;

/// Domain-specific error types shared by ports and core components
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum DomainError {
    /// Transcript or video metadata could not be obtained
    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),
    /// Model output did not match the expected format
    #[error("Selection parse error: {0}")]
    SelectionParse(String),
    /// Time range is unusable even after clamping
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),
    /// Media backend failed or produced no output
    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),
    /// A model call or media invocation exceeded its time bound
    #[error("Timed out: {0}")]
    Timeout(String),
    /// Model service could not be reached or rejected the request
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),
}

impl DomainError {
    /// Whether a map-phase request may degrade to zero candidates on this error
    pub fn is_recoverable_in_map(&self) -> bool {
        matches!(self, DomainError::SelectionParse(_))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::FsFail(err.to_string())
    }
}
