//! Record export in structured (JSON) and tabular (CSV) form
//!
//! The tabular form is long-format: one row per trial with the session
//! fields repeated on every row. Every field is quoted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};
use crate::types::{Amount, ParticipantId, Session, Summary, TrustCategory};

/// Bumped whenever the column set or order changes
pub const TABULAR_SCHEMA_VERSION: &str = "v1";

const FILE_PREFIX: &str = "trust_game_data";

/// Column order of the tabular export
pub const TABULAR_COLUMNS: [&str; 19] = [
    "schema_version",
    "participant_id",
    "started_at",
    "age",
    "gender",
    "field_of_study",
    "round",
    "amount_sent",
    "amount_kept",
    "return_rate",
    "partner_received",
    "amount_returned",
    "final_earnings",
    "decision_latency_ms",
    "recorded_at",
    "total_earnings",
    "average_amount_sent",
    "trust_category",
    "completed_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One row of the tabular export. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularRow {
    pub schema_version: String,
    pub participant_id: ParticipantId,
    pub started_at: DateTime<Utc>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub field_of_study: Option<String>,
    pub round: u32,
    pub amount_sent: Amount,
    pub amount_kept: u32,
    pub return_rate: f64,
    pub partner_received: u32,
    pub amount_returned: u32,
    pub final_earnings: u32,
    pub decision_latency_ms: u64,
    pub recorded_at: DateTime<Utc>,
    pub total_earnings: u32,
    pub average_amount_sent: f64,
    pub trust_category: TrustCategory,
    pub completed_at: DateTime<Utc>,
}

fn completed_summary(session: &Session) -> SharedResult<&Summary> {
    session
        .summary()
        .ok_or_else(|| SharedError::invariant("only a summarized session can be exported"))
}

/// Nested JSON mirroring the session record
pub fn export_structured(session: &Session) -> SharedResult<String> {
    completed_summary(session)?;
    Ok(serde_json::to_string_pretty(session)?)
}

/// Denormalized rows, one per trial
pub fn tabular_rows(session: &Session) -> SharedResult<Vec<TabularRow>> {
    let summary = completed_summary(session)?;
    let demographics = session.demographics();

    Ok(session
        .trials()
        .iter()
        .map(|trial| TabularRow {
            schema_version: TABULAR_SCHEMA_VERSION.to_string(),
            participant_id: session.participant_id().clone(),
            started_at: session.started_at(),
            age: demographics.map(|d| d.age),
            gender: demographics.map(|d| d.gender.clone()),
            field_of_study: demographics.map(|d| d.field_of_study.clone()),
            round: trial.round_index,
            amount_sent: trial.amount_sent,
            amount_kept: trial.amount_kept,
            return_rate: trial.return_rate,
            partner_received: trial.partner_received,
            amount_returned: trial.amount_returned,
            final_earnings: trial.final_earnings,
            decision_latency_ms: trial.decision_latency_ms,
            recorded_at: trial.recorded_at,
            total_earnings: summary.total_earnings,
            average_amount_sent: summary.average_amount_sent,
            trust_category: summary.trust_category,
            completed_at: summary.completed_at,
        })
        .collect())
}

/// CSV text with a header row, every field quoted
pub fn export_tabular(session: &Session) -> SharedResult<String> {
    let rows = tabular_rows(session)?;
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(TABULAR_COLUMNS)?;
    for row in &rows {
        writer.serialize(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| SharedError::SerializationError {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| SharedError::SerializationError {
        message: e.to_string(),
    })
}

/// Read tabular export text back into rows
pub fn parse_tabular(data: &str) -> SharedResult<Vec<TabularRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers = reader.headers().map_err(deserialization_error)?.clone();
    if headers.iter().ne(TABULAR_COLUMNS.iter().copied()) {
        return Err(SharedError::DeserializationError {
            message: format!("unexpected tabular header: {}", headers.iter().collect::<Vec<_>>().join(",")),
        });
    }

    reader
        .deserialize()
        .map(|row| row.map_err(deserialization_error))
        .collect()
}

fn deserialization_error(err: csv::Error) -> SharedError {
    SharedError::DeserializationError { message: err.to_string() }
}

/// `trust_game_data_<id>_<YYYYMMDDTHHMMSSZ>.<ext>`
pub fn export_filename(participant_id: &ParticipantId, at: DateTime<Utc>, format: ExportFormat) -> String {
    format!(
        "{FILE_PREFIX}_{participant_id}_{}.{}",
        at.format("%Y%m%dT%H%M%SZ"),
        format.extension()
    )
}

/// Key under which the local fallback keeps a session
pub fn local_storage_key(participant_id: &ParticipantId) -> String {
    format!("{FILE_PREFIX}_{participant_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::{compute_trial, GameParameters};
    use crate::types::Demographics;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
    }

    fn completed_session(demographics: Option<Demographics>) -> Session {
        let params = GameParameters::default();
        let mut session = Session::new("P1a2b3c4d".parse().unwrap(), at(0));
        if let Some(d) = demographics {
            session.set_demographics(d).unwrap();
        }
        let amounts = [Amount::Zero, Amount::Five, Amount::Ten, Amount::Five, Amount::Zero];
        for (i, amount) in amounts.into_iter().enumerate() {
            let round = i as u32 + 1;
            let trial = compute_trial(&params, round, amount, 800 + u64::from(round), at(round)).unwrap();
            session.push_trial(trial, params.total_rounds()).unwrap();
        }
        session.finalize().unwrap();
        session
    }

    #[test]
    fn test_unsummarized_session_is_rejected() {
        let session = Session::new(ParticipantId::new(), at(0));
        assert!(export_structured(&session).is_err());
        assert!(export_tabular(&session).is_err());
    }

    #[test]
    fn test_tabular_header_and_quoting() {
        let session = completed_session(Some(Demographics::new(25, None, None)));
        let csv = export_tabular(&session).unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        let expected: Vec<String> = TABULAR_COLUMNS.iter().map(|c| format!("\"{c}\"")).collect();
        assert_eq!(header, expected.join(","));

        let first = lines.next().unwrap();
        assert!(first.starts_with("\"v1\",\"P1a2b3c4d\","));
        assert!(first.contains("\"25\""));
        assert!(first.contains("\"Not specified\""));
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn test_tabular_round_trip_recovers_summary() {
        let session = completed_session(Some(Demographics::new(25, Some("Female"), None)));
        let rows = parse_tabular(&export_tabular(&session).unwrap()).unwrap();

        assert_eq!(rows.len(), 5);
        let total: u32 = rows.iter().map(|r| r.final_earnings).sum();
        assert_eq!(total, session.summary().unwrap().total_earnings);
        assert_eq!(rows, tabular_rows(&session).unwrap());
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.round, i as u32 + 1);
        }
    }

    #[test]
    fn test_embedded_quotes_and_newlines_survive() {
        let tricky = "say \"hi\",\nthen leave";
        let session = completed_session(Some(Demographics::new(40, Some(tricky), Some("a,b"))));
        let csv = export_tabular(&session).unwrap();
        assert!(csv.contains("\"say \"\"hi\"\",\nthen leave\""));

        let rows = parse_tabular(&csv).unwrap();
        assert_eq!(rows[0].gender.as_deref(), Some(tricky));
        assert_eq!(rows[0].field_of_study.as_deref(), Some("a,b"));
    }

    #[test]
    fn test_missing_demographics_export_as_empty_fields() {
        let session = completed_session(None);
        let rows = parse_tabular(&export_tabular(&session).unwrap()).unwrap();
        assert_eq!(rows[0].age, None);
        assert_eq!(rows[0].gender, None);
    }

    #[test]
    fn test_parse_rejects_foreign_header() {
        let err = parse_tabular("\"a\",\"b\"\n\"1\",\"2\"\n").unwrap_err();
        assert!(matches!(err, SharedError::DeserializationError { .. }));
    }

    #[test]
    fn test_structured_mirrors_session() {
        let session = completed_session(Some(Demographics::new(25, None, None)));
        let json = export_structured(&session).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["participantId"], "P1a2b3c4d");
        assert_eq!(value["demographics"]["fieldOfStudy"], "Not specified");
        assert_eq!(value["trials"].as_array().unwrap().len(), 5);
        assert_eq!(value["trials"][1]["amountReturned"], 9);
        assert_eq!(value["summary"]["trustCategory"], "Low Trust");

        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn test_file_naming() {
        let id: ParticipantId = "P1a2b3c4d".parse().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(
            export_filename(&id, at, ExportFormat::Csv),
            "trust_game_data_P1a2b3c4d_20240301T090507Z.csv"
        );
        assert_eq!(
            export_filename(&id, at, ExportFormat::Json),
            "trust_game_data_P1a2b3c4d_20240301T090507Z.json"
        );
        assert_eq!(local_storage_key(&id), "trust_game_data_P1a2b3c4d");
    }
}
