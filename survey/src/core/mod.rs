//! Core survey logic
//!
//! The state machine and its screens. No terminal or network I/O happens
//! here; submission goes through the injected `Submitter`.

pub mod machine;
pub mod screen;

pub use machine::SurveyMachine;
pub use screen::{DemographicsForm, Screen};
