//! Directory-backed key/value store standing in for on-device storage

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{SubmissionError, SubmissionResult};
use crate::traits::LocalStore;

/// Each key becomes `<dir>/<key>.json`
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> SubmissionResult<PathBuf> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(SubmissionError::StorageError { message: format!("invalid storage key '{key}'") });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn put(&self, key: &str, value: &str) -> SubmissionResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> SubmissionResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
