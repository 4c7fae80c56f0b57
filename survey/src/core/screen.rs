//! Screens of the survey and the demographics form

use std::fmt;

use shared::Demographics;

use crate::error::{SurveyError, SurveyResult};

/// Where the participant currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Instructions,
    Demographics,
    Decision { round: u32 },
    Feedback { round: u32 },
    FinalResults,
    Complete,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Welcome => write!(f, "welcome"),
            Screen::Instructions => write!(f, "instructions"),
            Screen::Demographics => write!(f, "demographics"),
            Screen::Decision { round } => write!(f, "decision (round {round})"),
            Screen::Feedback { round } => write!(f, "feedback (round {round})"),
            Screen::FinalResults => write!(f, "final results"),
            Screen::Complete => write!(f, "complete"),
        }
    }
}

/// Raw answers from the demographics screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemographicsForm {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub field_of_study: Option<String>,
}

impl DemographicsForm {
    /// Blank or non-numeric text counts as no answer
    pub fn parse_age(input: &str) -> Option<u32> {
        input.trim().parse().ok()
    }

    /// Age is the only required answer and must be at least 18
    pub fn validate(&self) -> SurveyResult<Demographics> {
        let age = self
            .age
            .ok_or_else(|| SurveyError::validation("Please enter your age."))?;
        if age < Demographics::MINIMUM_AGE {
            return Err(SurveyError::validation(format!(
                "You must be at least {} years old to participate.",
                Demographics::MINIMUM_AGE
            )));
        }
        Ok(Demographics::new(
            age,
            self.gender.as_deref(),
            self.field_of_study.as_deref(),
        ))
    }
}
