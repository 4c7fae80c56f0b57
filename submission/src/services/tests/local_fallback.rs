//! Tests for FileLocalStore and LocalFallback
//!
//! Covers the storage envelope, export files, and the guarantee that a
//! failing disk never turns into a pipeline error.

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use crate::error::SubmissionError;
use crate::services::{FileLocalStore, LocalFallback};
use crate::traits::{FallbackSink, LocalStore, MockLocalStore};
use crate::types::{LocalEnvelope, SubmissionPayload};

fn payload() -> SubmissionPayload {
    SubmissionPayload {
        participant_id: "P0badf00d".parse().unwrap(),
        csv_filename: "trust_game_data_P0badf00d_20240301T120000Z.csv".to_string(),
        json_filename: "trust_game_data_P0badf00d_20240301T120000Z.json".to_string(),
        csv_data: "\"schema_version\"\n\"v1\"\n".to_string(),
        json_data: "{\"participantId\":\"P0badf00d\"}".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FileLocalStore::new(dir.path().join("nested"));

    assert_eq!(store.get("trust_game_data_P1").await.unwrap(), None);
    store.put("trust_game_data_P1", "{}").await.unwrap();
    assert_eq!(store.get("trust_game_data_P1").await.unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn test_store_rejects_path_like_keys() {
    let dir = TempDir::new().unwrap();
    let store = FileLocalStore::new(dir.path());

    let err = store.put("../escape", "{}").await.unwrap_err();
    assert!(matches!(err, SubmissionError::StorageError { .. }));
    assert!(store.put("", "{}").await.is_err());
}

#[tokio::test]
async fn test_fallback_writes_envelope_and_exports() {
    let dir = TempDir::new().unwrap();
    let store_dir = dir.path().join("store");
    let downloads = dir.path().join("downloads");
    let fallback = LocalFallback::new(FileLocalStore::new(&store_dir)).with_downloads_dir(&downloads);

    let payload = payload();
    let receipt = fallback.store(&payload).await;

    assert!(receipt.stored);
    assert!(receipt.error.is_none());
    assert_eq!(receipt.storage_key, "trust_game_data_P0badf00d");
    assert_eq!(receipt.files.len(), 2);

    let raw = std::fs::read_to_string(store_dir.join("trust_game_data_P0badf00d.json")).unwrap();
    let envelope: LocalEnvelope = serde_json::from_str(&raw).unwrap();
    assert_eq!(envelope.participant_id, payload.participant_id);
    assert_eq!(envelope.timestamp, payload.created_at);
    assert_eq!(envelope.csv_data, payload.csv_data);

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for field in ["participantId", "timestamp", "csvData", "savedAt"] {
        assert!(value.get(field).is_some(), "envelope should carry {field}");
    }

    let csv = std::fs::read_to_string(downloads.join(&payload.csv_filename)).unwrap();
    assert_eq!(csv, payload.csv_data);
    assert!(downloads.join(&payload.json_filename).exists());
}

#[tokio::test]
async fn test_fallback_without_downloads_dir_writes_no_files() {
    let dir = TempDir::new().unwrap();
    let fallback = LocalFallback::new(FileLocalStore::new(dir.path()));

    let receipt = fallback.store(&payload()).await;
    assert!(receipt.stored);
    assert!(receipt.files.is_empty());
}

#[tokio::test]
async fn test_fallback_reports_storage_failure_in_receipt() {
    let mut store = MockLocalStore::new();
    store.expect_get().times(1).returning(|_| Ok(None));
    store.expect_put().times(1).returning(|_, _| {
        Err(SubmissionError::StorageError { message: "quota exceeded".to_string() })
    });

    let receipt = LocalFallback::new(store).store(&payload()).await;

    assert!(!receipt.stored);
    assert!(receipt.files.is_empty());
    assert!(receipt.error.unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn test_fallback_keeps_existing_envelope() {
    let mut store = MockLocalStore::new();
    store
        .expect_get()
        .withf(|key| key == "trust_game_data_P0badf00d")
        .times(1)
        .returning(|_| Ok(Some("{\"csvData\":\"first\"}".to_string())));
    store.expect_put().never();

    let receipt = LocalFallback::new(store).store(&payload()).await;

    assert!(receipt.stored);
    assert!(receipt.error.is_none());
}

#[tokio::test]
async fn test_second_store_does_not_overwrite() {
    let dir = TempDir::new().unwrap();
    let fallback = LocalFallback::new(FileLocalStore::new(dir.path()));
    let first = payload();
    fallback.store(&first).await;

    let mut second = payload();
    second.csv_data = "\"changed\"\n".to_string();
    let receipt = fallback.store(&second).await;
    assert!(receipt.stored);

    let raw = std::fs::read_to_string(dir.path().join("trust_game_data_P0badf00d.json")).unwrap();
    let envelope: LocalEnvelope = serde_json::from_str(&raw).unwrap();
    assert_eq!(envelope.csv_data, first.csv_data);
}
