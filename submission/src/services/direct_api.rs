//! Direct upload to the open-data collection API

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use crate::error::TransportError;
use crate::services::http;
use crate::traits::SubmissionStrategy;
use crate::types::{AttemptReceipt, SubmissionPayload, TransportKind};

/// Fields the collection API may use to acknowledge a write
const ACK_FIELDS: &[&str] = &["sessionId", "experimentId", "id"];

pub struct DirectApiStrategy {
    client: reqwest::Client,
    endpoint: Option<Url>,
    experiment_id: Option<String>,
}

impl DirectApiStrategy {
    pub fn new(endpoint: Option<Url>, experiment_id: Option<String>) -> Self {
        Self {
            client: http::client(),
            endpoint,
            experiment_id,
        }
    }
}

#[async_trait]
impl SubmissionStrategy for DirectApiStrategy {
    fn kind(&self) -> TransportKind {
        TransportKind::DirectApi
    }

    async fn attempt(&self, payload: &SubmissionPayload) -> Result<AttemptReceipt, TransportError> {
        let endpoint = self.endpoint.as_ref().ok_or_else(|| TransportError::not_configured("data API url"))?;
        let experiment_id = self
            .experiment_id
            .as_deref()
            .ok_or_else(|| TransportError::not_configured("experiment id"))?;

        let request_body = json!({
            "experimentID": experiment_id,
            "filename": payload.csv_filename,
            "data": payload.csv_data,
        });

        let response = self
            .client
            .post(endpoint.clone())
            .header("Accept", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(http::network_error)?;
        let response = http::ensure_success(response)?;
        let body = http::json_body(response).await?;

        // A 2xx without an identifier is not an acknowledgement
        let reference = http::string_field(&body, ACK_FIELDS).ok_or_else(|| TransportError::MalformedResponse {
            message: "No session or experiment identifier in response".to_string(),
        })?;

        Ok(AttemptReceipt {
            reference: Some(reference),
            location: Some(endpoint.to_string()),
        })
    }
}
