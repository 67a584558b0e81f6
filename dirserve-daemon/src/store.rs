//! In-memory directory engine backed by a YAML snapshot.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use dirserve_core::snapshot::{self, DirectorySnapshot, SnapshotError};

use crate::error::DaemonError;
use crate::paths::snapshot_path;
use crate::services::{DirectoryError, DirectoryService};

/// Directory content held fully in memory; read-only after load.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entries: BTreeMap<String, Value>,
}

impl MemoryDirectory {
    pub fn new(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }

    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Self {
        Self {
            entries: snapshot.entries,
        }
    }

    /// Load the directory from `<home>/.dirserve/directory.yaml`.
    ///
    /// A missing snapshot yields an empty directory; a malformed one is a
    /// startup error.
    pub fn load_at(home: &Path) -> Result<Self, DaemonError> {
        let path = snapshot_path(home);
        match snapshot::load_at(&path) {
            Ok(snapshot) => Ok(Self::from_snapshot(snapshot)),
            Err(SnapshotError::NotFound { path }) => {
                tracing::info!(path = %path.display(), "no directory snapshot; starting empty");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DirectoryService for MemoryDirectory {
    async fn get(&self, key: &str) -> Result<Value, DirectoryError> {
        Ok(self.entries.get(key).cloned().unwrap_or(Value::Null))
    }

    async fn query(&self, attribute: &str, value: &Value) -> Result<Value, DirectoryError> {
        let matches: Vec<Value> = self
            .entries
            .values()
            .filter(|entry| entry.get(attribute) == Some(value))
            .cloned()
            .collect();
        Ok(Value::Array(matches))
    }
}
