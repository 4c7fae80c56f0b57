//! Submission payloads, receipts and outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use shared::export::{self, ExportFormat};
use shared::{ParticipantId, Session, SharedResult};

/// Transports in the order the pipeline tries them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    DirectApi,
    ServerProxy,
    DispatchEvent,
    IssueRecord,
    LocalFallback,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::DirectApi => write!(f, "direct_api"),
            TransportKind::ServerProxy => write!(f, "server_proxy"),
            TransportKind::DispatchEvent => write!(f, "dispatch_event"),
            TransportKind::IssueRecord => write!(f, "issue_record"),
            TransportKind::LocalFallback => write!(f, "local_fallback"),
        }
    }
}

/// Everything a transport needs to deliver one completed session
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub participant_id: ParticipantId,
    pub csv_filename: String,
    pub json_filename: String,
    pub csv_data: String,
    pub json_data: String,
    pub created_at: DateTime<Utc>,
}

impl SubmissionPayload {
    /// Build both export forms of a summarized session
    pub fn from_session(session: &Session, created_at: DateTime<Utc>) -> SharedResult<Self> {
        let participant_id = session.participant_id().clone();
        Ok(Self {
            csv_filename: export::export_filename(&participant_id, created_at, ExportFormat::Csv),
            json_filename: export::export_filename(&participant_id, created_at, ExportFormat::Json),
            csv_data: export::export_tabular(session)?,
            json_data: export::export_structured(session)?,
            participant_id,
            created_at,
        })
    }

    pub fn storage_key(&self) -> String {
        export::local_storage_key(&self.participant_id)
    }
}

/// What a remote store handed back on acceptance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptReceipt {
    /// Identifier assigned by the remote side (session id, issue number)
    pub reference: Option<String>,
    /// Where the record can be found or which endpoint accepted it
    pub location: Option<String>,
}

/// Result of handing the payload to the local fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackReceipt {
    pub storage_key: String,
    pub stored: bool,
    pub files: Vec<PathBuf>,
    pub error: Option<String>,
}

/// Envelope kept in local storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEnvelope {
    pub participant_id: ParticipantId,
    pub timestamp: DateTime<Utc>,
    pub csv_data: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    Accepted,
    Failed { reason: String },
}

/// One line of the attempt log kept on the outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub transport: TransportKind,
    pub status: AttemptStatus,
    pub elapsed_ms: u64,
}

/// User-facing classification of the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeState {
    /// A remote store accepted the record
    Success,
    /// Remote delivery failed, the record is stored on this device
    Degraded,
    /// Nothing could be written; only the in-memory payload remains
    HardFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionDetail {
    Remote {
        receipt: AttemptReceipt,
    },
    Local {
        receipt: FallbackReceipt,
        csv_filename: String,
        json_filename: String,
        csv_data: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub succeeded: bool,
    pub transport_used: TransportKind,
    pub state: OutcomeState,
    pub detail: SubmissionDetail,
    pub attempts: Vec<AttemptRecord>,
}

impl SubmissionOutcome {
    pub fn remote_receipt(&self) -> Option<&AttemptReceipt> {
        match &self.detail {
            SubmissionDetail::Remote { receipt } => Some(receipt),
            SubmissionDetail::Local { .. } => None,
        }
    }
}
