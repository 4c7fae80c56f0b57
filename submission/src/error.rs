//! Submission error types

use std::time::Duration;
use thiserror::Error;

use shared::SharedError;

/// Result type for pipeline construction and local I/O
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Errors that stop the pipeline from being built or a payload from being produced
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Configuration error: {field} ({message})")]
    ConfigError { field: String, message: String },

    #[error("Local storage error: {message}")]
    StorageError { message: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SubmissionError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubmissionError::ConfigError { field: field.into(), message: message.into() }
    }
}

/// Failure of a single transport attempt. Always downgraded to "try the
/// next strategy" by the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("transport not configured: {what}")]
    NotConfigured { what: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("attempt timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("endpoint not found")]
    NotFound,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

impl TransportError {
    pub fn not_configured(what: impl Into<String>) -> Self {
        TransportError::NotConfigured { what: what.into() }
    }
}
