//! Trust game survey
//!
//! Walks a participant through five rounds of the investment game, shows
//! the payoff of every round, summarizes the session and hands the record
//! to the submission pipeline.

pub mod core;
pub mod error;
pub mod render;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use core::{DemographicsForm, Screen, SurveyMachine};
pub use error::{SurveyError, SurveyResult};
pub use services::{SystemClock, TerminalDriver};
pub use traits::{Clock, SessionView};
