//! Trait seams of the submission pipeline, with mockall mocks for testing

use async_trait::async_trait;

use shared::Session;

use crate::error::{SubmissionResult, TransportError};
use crate::types::{AttemptReceipt, FallbackReceipt, SubmissionOutcome, SubmissionPayload, TransportKind};

/// One remote transport the pipeline can try
#[mockall::automock]
#[async_trait]
pub trait SubmissionStrategy: Send + Sync {
    /// Which transport this is, for ordering and reporting
    fn kind(&self) -> TransportKind;

    /// Deliver the payload. Every failure is reported as a `TransportError`;
    /// implementations never panic past this boundary.
    async fn attempt(&self, payload: &SubmissionPayload) -> Result<AttemptReceipt, TransportError>;
}

/// Last resort at the end of the chain. Cannot fail from the pipeline's
/// point of view; problems are reported inside the receipt.
#[mockall::automock]
#[async_trait]
pub trait FallbackSink: Send + Sync {
    async fn store(&self, payload: &SubmissionPayload) -> FallbackReceipt;
}

/// On-device key/value storage used by the local fallback
#[mockall::automock]
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> SubmissionResult<()>;

    async fn get(&self, key: &str) -> SubmissionResult<Option<String>>;
}

/// What the survey state machine hands a finished session to
#[mockall::automock]
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Fails only when the session cannot be exported (not summarized)
    async fn submit(&self, session: &Session) -> SubmissionResult<SubmissionOutcome>;
}
