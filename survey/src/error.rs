//! Survey-specific error types

use thiserror::Error;

use shared::SharedError;
use submission::SubmissionError;

use crate::core::Screen;

#[derive(Error, Debug)]
pub enum SurveyError {
    /// Participant input rejected; the screen does not change
    #[error("{message}")]
    Validation { message: String },

    #[error("Cannot {event} while on the {screen} screen")]
    InvalidTransition { event: &'static str, screen: Screen },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("Submission error: {0}")]
    SubmissionError(#[from] SubmissionError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SurveyError {
    pub fn validation(message: impl Into<String>) -> Self {
        SurveyError::Validation { message: message.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SurveyError::Validation { .. })
    }
}

pub type SurveyResult<T> = Result<T, SurveyError>;
