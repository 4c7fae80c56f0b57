//! Shared error types for the trust game workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    /// A precondition the state machine is responsible for was broken.
    /// Never user-recoverable; callers abort the operation.
    #[error("Invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Invalid parameter: {field} = {value}")]
    InvalidParameter { field: String, value: String },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Invalid participant id: {input}")]
    InvalidParticipantId { input: String },
}

impl SharedError {
    pub fn invariant(message: impl Into<String>) -> Self {
        SharedError::InvariantViolation { message: message.into() }
    }
}

impl From<csv::Error> for SharedError {
    fn from(err: csv::Error) -> Self {
        SharedError::SerializationError { message: err.to_string() }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        SharedError::SerializationError { message: err.to_string() }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
