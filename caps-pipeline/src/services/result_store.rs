//! Append-only storage of processed items
//!
//! The stored log is a single JSON array, read in full and rewritten in full
//! on every append. A missing or unparsable log reads as empty. Entries are
//! carried through a rewrite as raw JSON, so records that do not match the
//! current item shape are never dropped; `load_all` skips them.
//!
//! # Concurrency
//! Appends are NOT coordinated across concurrent runs: two runs appending at
//! the same time both read the same prior log and the later rename wins,
//! losing the other run's item. Each write goes through its own temp file,
//! so a reader never sees a partially written log.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::ProcessedItem;

/// Storage failure (only ever surfaced as `false` from `append`)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} does not hold a JSON array")]
    NotAnArray(PathBuf),

    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only processed item log
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Append one item; `true` when it was persisted
    ///
    /// Never fails outward. On `false` the prior contents are unchanged.
    async fn append(&self, item: &ProcessedItem) -> bool;

    /// Read the whole log (empty when missing or unreadable)
    async fn load_all(&self) -> Vec<ProcessedItem>;
}

/// JSON array file store
#[derive(Debug, Clone)]
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

    /// Raw log entries, untyped so records written by other producers survive
    /// a rewrite
    ///
    /// Missing or unparsable logs read as empty. An unreadable file or a
    /// JSON document that is not an array is an error, leaving the log alone.
    async fn read_entries(&self) -> Result<Vec<Value>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => Err(StoreError::NotAnArray(self.path.clone())),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Stored log corrupt, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn read_log(&self) -> Vec<ProcessedItem> {
        let entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Stored log unreadable, treating as empty");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!(index, error = %e, "Skipping stored entry in foreign format");
                    None
                }
            })
            .collect()
    }

    async fn try_append(&self, item: &ProcessedItem) -> Result<usize, StoreError> {
        let mut entries = self.read_entries().await?;
        entries.push(serde_json::to_value(item)?);

        let encoded = serde_json::to_vec_pretty(&entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        // Unique temp name per write; rename replaces the log in one step
        let tmp_path = self.temp_path();
        if let Err(source) = tokio::fs::write(&tmp_path, &encoded).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io {
                path: tmp_path,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        Ok(entries.len())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stored_results.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn append(&self, item: &ProcessedItem) -> bool {
        match self.try_append(item).await {
            Ok(len) => {
                debug!(path = %self.path.display(), entries = len, "Item appended to stored log");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist item");
                false
            }
        }
    }

    async fn load_all(&self) -> Vec<ProcessedItem> {
        self.read_log().await
    }
}

/// In-memory store with the same contract
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: Mutex<Vec<ProcessedItem>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn append(&self, item: &ProcessedItem) -> bool {
        self.items.lock().await.push(item.clone());
        true
    }

    async fn load_all(&self) -> Vec<ProcessedItem> {
        self.items.lock().await.clone()
    }
}
