//! Last link of the chain: keep the record on this device and hand the
//! participant files they can send in manually.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;

use shared::{component_debug, component_info, component_warn, Component};

use crate::error::SubmissionResult;
use crate::traits::{FallbackSink, LocalStore};
use crate::types::{FallbackReceipt, LocalEnvelope, SubmissionPayload};

pub struct LocalFallback<S: LocalStore> {
    store: S,
    downloads_dir: Option<PathBuf>,
}

impl<S: LocalStore> LocalFallback<S> {
    pub fn new(store: S) -> Self {
        Self { store, downloads_dir: None }
    }

    pub fn with_downloads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.downloads_dir = Some(dir.into());
        self
    }

    /// The first envelope stored under a key is kept
    async fn save_envelope(&self, payload: &SubmissionPayload) -> SubmissionResult<()> {
        let key = payload.storage_key();
        if self.store.get(&key).await?.is_some() {
            component_debug!(Component::Submission, key = %key, "Record already stored locally");
            return Ok(());
        }

        let envelope = LocalEnvelope {
            participant_id: payload.participant_id.clone(),
            timestamp: payload.created_at,
            csv_data: payload.csv_data.clone(),
            saved_at: Utc::now(),
        };
        let value = serde_json::to_string(&envelope)?;
        self.store.put(&key, &value).await
    }

    async fn write_exports(&self, payload: &SubmissionPayload) -> SubmissionResult<Vec<PathBuf>> {
        let Some(dir) = &self.downloads_dir else {
            return Ok(Vec::new());
        };
        fs::create_dir_all(dir).await?;

        let csv_path = dir.join(&payload.csv_filename);
        fs::write(&csv_path, &payload.csv_data).await?;
        let json_path = dir.join(&payload.json_filename);
        fs::write(&json_path, &payload.json_data).await?;

        Ok(vec![csv_path, json_path])
    }
}

#[async_trait]
impl<S: LocalStore> FallbackSink for LocalFallback<S> {
    async fn store(&self, payload: &SubmissionPayload) -> FallbackReceipt {
        let storage_key = payload.storage_key();
        let mut errors = Vec::new();

        let stored = match self.save_envelope(payload).await {
            Ok(()) => true,
            Err(e) => {
                component_warn!(Component::Submission, key = %storage_key, "Local storage write failed: {}", e);
                errors.push(format!("local storage: {e}"));
                false
            }
        };

        let files = match self.write_exports(payload).await {
            Ok(files) => files,
            Err(e) => {
                component_warn!(Component::Submission, "Export file write failed: {}", e);
                errors.push(format!("export files: {e}"));
                Vec::new()
            }
        };

        component_info!(
            Component::Submission,
            key = %storage_key,
            stored,
            files = files.len(),
            "💾 Record kept locally for manual submission"
        );

        FallbackReceipt {
            storage_key,
            stored: stored || !files.is_empty(),
            files,
            error: (!errors.is_empty()).then(|| errors.join("; ")),
        }
    }
}
