//! Repository dispatch event asking an out-of-band workflow to write the record
//!
//! Acceptance means the event was queued, not that the write happened.

use async_trait::async_trait;
use serde_json::json;

use crate::config::GitHubTarget;
use crate::error::TransportError;
use crate::services::http;
use crate::traits::SubmissionStrategy;
use crate::types::{AttemptReceipt, SubmissionPayload, TransportKind};

pub const DISPATCH_EVENT_TYPE: &str = "trust_game_submission";

pub struct DispatchEventStrategy {
    client: reqwest::Client,
    target: Option<GitHubTarget>,
}

impl DispatchEventStrategy {
    pub fn new(target: Option<GitHubTarget>) -> Self {
        Self {
            client: http::client(),
            target,
        }
    }
}

#[async_trait]
impl SubmissionStrategy for DispatchEventStrategy {
    fn kind(&self) -> TransportKind {
        TransportKind::DispatchEvent
    }

    async fn attempt(&self, payload: &SubmissionPayload) -> Result<AttemptReceipt, TransportError> {
        let target = self.target.as_ref().ok_or_else(|| TransportError::not_configured("dispatch repository"))?;
        let url = target
            .endpoint("dispatches")
            .map_err(|e| TransportError::not_configured(e.to_string()))?;

        let request_body = json!({
            "event_type": DISPATCH_EVENT_TYPE,
            "client_payload": {
                "participantId": payload.participant_id,
                "filename": payload.csv_filename,
                "csvData": payload.csv_data,
                "timestamp": payload.created_at,
            }
        });

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&target.token)
            .header("Accept", "application/vnd.github+json")
            .json(&request_body)
            .send()
            .await
            .map_err(http::network_error)?;
        http::ensure_success(response)?;

        Ok(AttemptReceipt {
            reference: Some(format!("{}/{}", target.owner, target.repo)),
            location: Some(url.to_string()),
        })
    }
}
