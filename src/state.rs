// src/state.rs

//! Persisted watcher state.
//!
//! One small JSON document at a configured path. The store owns the on-disk
//! file; watchers keep the in-memory copy for the process lifetime and read
//! from disk only at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// State for the updated-date flavor.
///
/// Invariant: both fields are fixed-width ISO `YYYY-MM-DD` strings, so
/// lexicographic order is chronological order. `previous_seen_updated_date`,
/// when present, is ≤ `last_seen_updated_date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateState {
    /// Most recently observed "updated" date
    pub last_seen_updated_date: Option<String>,

    /// The date the page displayed before the last recorded change
    pub previous_seen_updated_date: Option<String>,
}

impl DateState {
    /// True until the first successful seed or check.
    pub fn is_empty(&self) -> bool {
        self.last_seen_updated_date.is_none()
    }
}

/// State for the change-list flavor: entries exactly as last extracted,
/// page display order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeListState {
    pub last_seen_changes: Vec<String>,
}

/// Owner of the on-disk state document.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored document.
    ///
    /// A missing file is `None`. An unreadable or unparseable file is logged
    /// as a warning and also treated as `None`: a corrupt state file means
    /// "no prior state", never a fatal error.
    pub async fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Could not read state file {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Could not parse state file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Persist a document atomically (write to temp, then rename), so an
    /// external reader never observes a half-written file.
    pub async fn save<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
