//! Persistence for the trusted-source list.
//!
//! One JSON document, overwritten wholesale on every save; last write wins.
//! `Missing` and a corrupt document are distinct outcomes so the registry
//! can tell "no sources yet" apart from a damaged file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The persisted document: `{domains, lastUpdated, addedBy}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceList {
    pub domains: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub added_by: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt source list: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result of a load: the persisted document, or nothing persisted yet.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(SourceList),
    Missing,
}

#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn load(&self) -> Result<LoadOutcome, StoreError>;
    async fn save(&self, list: &SourceList) -> Result<(), StoreError>;
}

/// File-backed store holding the list as pretty-printed JSON.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SourceStore for JsonFileStore {
    async fn load(&self) -> Result<LoadOutcome, StoreError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
            Err(e) => return Err(e.into()),
        };
        let list = serde_json::from_str(&data)?;
        Ok(LoadOutcome::Loaded(list))
    }

    async fn save(&self, list: &SourceList) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_string_pretty(list)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: std::sync::Mutex<Option<SourceList>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds the given list.
    pub fn preloaded(list: SourceList) -> Self {
        Self {
            inner: std::sync::Mutex::new(Some(list)),
        }
    }
}

#[async_trait]
impl SourceStore for MemoryStore {
    async fn load(&self) -> Result<LoadOutcome, StoreError> {
        match self.inner.lock().expect("store lock").clone() {
            Some(list) => Ok(LoadOutcome::Loaded(list)),
            None => Ok(LoadOutcome::Missing),
        }
    }

    async fn save(&self, list: &SourceList) -> Result<(), StoreError> {
        *self.inner.lock().expect("store lock") = Some(list.clone());
        Ok(())
    }
}
