//! Trait seams of the survey: time source and the read-only view handed
//! to renderers.

use chrono::{DateTime, Utc};

use shared::{GameParameters, RoundFeedback, Session};
use submission::SubmissionOutcome;

use crate::core::Screen;

/// Wall-clock source for timestamps and decision latency
#[mockall::automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Read-only access to the running survey
pub trait SessionView {
    fn screen(&self) -> Screen;

    fn session(&self) -> &Session;

    fn params(&self) -> &GameParameters;

    /// Outcome of the most recent round, while on its feedback screen and after
    fn latest_feedback(&self) -> Option<&RoundFeedback>;

    /// Set once the final results screen has submitted the record
    fn submission(&self) -> Option<&SubmissionOutcome>;
}
