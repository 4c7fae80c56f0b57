//! Shared record types for the trust game survey
//!
//! Holds the session data model, the payoff calculator, the record
//! exporter and the logging helpers used by the `survey` and
//! `submission` crates.

pub mod errors;
pub mod export;
pub mod logging;
pub mod payoff;
pub mod types;

pub use errors::*;
pub use export::{ExportFormat, TabularRow};
pub use logging::Component;
pub use payoff::{GameParameters, ReturnRateTable, RoundFeedback};
pub use types::*;
