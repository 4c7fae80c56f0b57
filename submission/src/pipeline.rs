//! Ordered fallback chain over the submission strategies
//!
//! Strategies run strictly one after another, each fully resolved before
//! the next starts. The first acceptance ends the chain. When every remote
//! strategy has failed the local fallback takes the record.

use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};

use shared::{component_debug, component_info, component_warn, Component, Session};

use crate::config::SubmissionConfig;
use crate::error::{SubmissionResult, TransportError};
use crate::services::{
    DirectApiStrategy, DispatchEventStrategy, FileLocalStore, IssueRecordStrategy, LocalFallback,
    ServerProxyStrategy,
};
use crate::traits::{FallbackSink, SubmissionStrategy, Submitter};
use crate::types::{
    AttemptRecord, AttemptStatus, OutcomeState, SubmissionDetail, SubmissionOutcome, SubmissionPayload,
    TransportKind,
};

pub struct SubmissionPipeline {
    strategies: Vec<Box<dyn SubmissionStrategy>>,
    fallback: Box<dyn FallbackSink>,
    attempt_timeout: Duration,
}

impl SubmissionPipeline {
    /// Empty chain that goes straight to `fallback`
    pub fn new<F>(fallback: F, attempt_timeout: Duration) -> Self
    where
        F: FallbackSink + 'static,
    {
        Self {
            strategies: Vec::new(),
            fallback: Box::new(fallback),
            attempt_timeout,
        }
    }

    /// Append a strategy after the ones already registered
    pub fn with_strategy<S>(mut self, strategy: S) -> Self
    where
        S: SubmissionStrategy + 'static,
    {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Standard chain: direct API, proxies, dispatch event, issue, local fallback
    pub fn from_config(config: &SubmissionConfig) -> Self {
        let mut fallback = LocalFallback::new(FileLocalStore::new(&config.data_dir));
        if let Some(dir) = &config.downloads_dir {
            fallback = fallback.with_downloads_dir(dir);
        }

        let pipeline = Self::new(fallback, config.attempt_timeout);
        if config.offline {
            return pipeline;
        }

        pipeline
            .with_strategy(DirectApiStrategy::new(config.data_api_url.clone(), config.experiment_id.clone()))
            .with_strategy(ServerProxyStrategy::new(config.proxy_urls.clone()))
            .with_strategy(DispatchEventStrategy::new(config.github.clone()))
            .with_strategy(IssueRecordStrategy::new(config.github.clone()))
    }

    /// Transports in the order they will be tried
    pub fn order(&self) -> Vec<TransportKind> {
        self.strategies
            .iter()
            .map(|s| s.kind())
            .chain(std::iter::once(TransportKind::LocalFallback))
            .collect()
    }

    /// Run the chain for one payload. Never fails: the local fallback is
    /// always the last resort.
    pub async fn submit_payload(&self, payload: &SubmissionPayload) -> SubmissionOutcome {
        let mut attempts = Vec::with_capacity(self.strategies.len() + 1);

        for strategy in &self.strategies {
            let kind = strategy.kind();
            component_debug!(Component::Submission, transport = %kind, "Attempting submission");

            let started = Instant::now();
            let result = match tokio::time::timeout(self.attempt_timeout, strategy.attempt(payload)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout { after: self.attempt_timeout }),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(receipt) => {
                    attempts.push(AttemptRecord {
                        transport: kind,
                        status: AttemptStatus::Accepted,
                        elapsed_ms,
                    });
                    component_info!(
                        Component::Submission,
                        transport = %kind,
                        elapsed_ms,
                        "✅ Submission accepted for {}",
                        payload.participant_id
                    );
                    return SubmissionOutcome {
                        succeeded: true,
                        transport_used: kind,
                        state: OutcomeState::Success,
                        detail: SubmissionDetail::Remote { receipt },
                        attempts,
                    };
                }
                Err(e) => {
                    component_warn!(Component::Submission, transport = %kind, elapsed_ms, "Transport failed: {}", e);
                    attempts.push(AttemptRecord {
                        transport: kind,
                        status: AttemptStatus::Failed { reason: e.to_string() },
                        elapsed_ms,
                    });
                }
            }
        }

        if !self.strategies.is_empty() {
            component_warn!(
                Component::Submission,
                "All {} remote transports failed, falling back to local storage",
                self.strategies.len()
            );
        }

        let started = Instant::now();
        let receipt = self.fallback.store(payload).await;
        attempts.push(AttemptRecord {
            transport: TransportKind::LocalFallback,
            status: AttemptStatus::Accepted,
            elapsed_ms: started.elapsed().as_millis() as u64,
        });

        let state = if receipt.stored {
            OutcomeState::Degraded
        } else {
            OutcomeState::HardFailure
        };

        SubmissionOutcome {
            succeeded: true,
            transport_used: TransportKind::LocalFallback,
            state,
            detail: SubmissionDetail::Local {
                receipt,
                csv_filename: payload.csv_filename.clone(),
                json_filename: payload.json_filename.clone(),
                csv_data: payload.csv_data.clone(),
            },
            attempts,
        }
    }
}

#[async_trait]
impl Submitter for SubmissionPipeline {
    async fn submit(&self, session: &Session) -> SubmissionResult<SubmissionOutcome> {
        let payload = SubmissionPayload::from_session(session, Utc::now())?;
        Ok(self.submit_payload(&payload).await)
    }
}
