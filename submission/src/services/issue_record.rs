//! Tracked issue embedding the record, promoted into the store later

use async_trait::async_trait;
use serde_json::json;

use crate::config::GitHubTarget;
use crate::error::TransportError;
use crate::services::http;
use crate::traits::SubmissionStrategy;
use crate::types::{AttemptReceipt, SubmissionPayload, TransportKind};

pub const ISSUE_LABEL: &str = "trust-game-data";

pub struct IssueRecordStrategy {
    client: reqwest::Client,
    target: Option<GitHubTarget>,
}

impl IssueRecordStrategy {
    pub fn new(target: Option<GitHubTarget>) -> Self {
        Self {
            client: http::client(),
            target,
        }
    }

    fn issue_body(payload: &SubmissionPayload) -> String {
        let fence = code_fence(&payload.csv_data);
        format!(
            "Participant: `{}`\nFilename: `{}`\nSubmitted: {}\n\n{fence}csv\n{}{fence}\n",
            payload.participant_id,
            payload.csv_filename,
            payload.created_at.to_rfc3339(),
            payload.csv_data
        )
    }
}

/// Backtick fence longer than any backtick run inside `data`
fn code_fence(data: &str) -> String {
    let longest = data
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

#[async_trait]
impl SubmissionStrategy for IssueRecordStrategy {
    fn kind(&self) -> TransportKind {
        TransportKind::IssueRecord
    }

    async fn attempt(&self, payload: &SubmissionPayload) -> Result<AttemptReceipt, TransportError> {
        let target = self.target.as_ref().ok_or_else(|| TransportError::not_configured("issue repository"))?;
        let url = target
            .endpoint("issues")
            .map_err(|e| TransportError::not_configured(e.to_string()))?;

        let request_body = json!({
            "title": format!("Trust game data: {}", payload.participant_id),
            "body": Self::issue_body(payload),
            "labels": [ISSUE_LABEL],
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&target.token)
            .header("Accept", "application/vnd.github+json")
            .json(&request_body)
            .send()
            .await
            .map_err(http::network_error)?;
        let response = http::ensure_success(response)?;
        let body = http::json_body(response).await?;

        Ok(AttemptReceipt {
            reference: http::string_field(&body, &["number"]),
            location: http::string_field(&body, &["html_url"]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_issue_body_fences_csv() {
        let payload = SubmissionPayload {
            participant_id: "Pabc12345".parse().unwrap(),
            csv_filename: "f.csv".to_string(),
            json_filename: "f.json".to_string(),
            csv_data: "\"a\",\"b\"\n".to_string(),
            json_data: "{}".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        };
        let body = IssueRecordStrategy::issue_body(&payload);
        assert!(body.contains("Participant: `Pabc12345`"));
        assert!(body.contains("```csv\n\"a\",\"b\"\n```"));
    }

    #[test]
    fn test_fence_outgrows_backticks_in_data() {
        assert_eq!(code_fence("plain"), "```");
        assert_eq!(code_fence("a ` b `` c"), "```");
        assert_eq!(code_fence("```"), "````");
        assert_eq!(code_fence("x`````y"), "``````");

        let payload = SubmissionPayload {
            participant_id: "Pabc12345".parse().unwrap(),
            csv_filename: "f.csv".to_string(),
            json_filename: "f.json".to_string(),
            csv_data: "\"```\nPhysics\"\n".to_string(),
            json_data: "{}".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        };
        let body = IssueRecordStrategy::issue_body(&payload);
        assert!(body.contains("````csv\n\"```\nPhysics\"\n````\n"));
    }
}
