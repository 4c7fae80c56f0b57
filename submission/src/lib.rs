//! Submission pipeline for completed trust game sessions
//!
//! Delivers a finished session to a remote store by trying an ordered list
//! of transports, ending with a local fallback that always keeps the
//! record on this device.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod traits;
pub mod types;

pub use config::{GitHubTarget, SubmissionConfig};
pub use error::{SubmissionError, SubmissionResult, TransportError};
pub use pipeline::SubmissionPipeline;
pub use traits::*;
pub use types::*;
