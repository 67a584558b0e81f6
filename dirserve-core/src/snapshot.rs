//! Directory snapshot document.
//!
//! The daemon serves lookups from an in-memory directory loaded once at
//! startup from a YAML snapshot:
//!
//! ```yaml
//! version: 1
//! generated_at: 2026-07-14T09:30:00Z
//! entries:
//!   /users/alice:
//!     uid: 1001
//!     shell: /bin/zsh
//! ```
//!
//! Loading takes an explicit path; resolving the well-known location from a
//! home directory is the daemon's concern.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors from reading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No snapshot file at the expected path.
    #[error("directory snapshot not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse failure — includes file path and line context.
    #[error("failed to parse directory snapshot at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// The persisted directory content, keyed by lookup path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: BTreeMap<String, Value>,
}

/// Load a snapshot from `path`.
///
/// Returns [`SnapshotError::NotFound`] if absent, [`SnapshotError::Parse`]
/// (with path and line context) if malformed.
pub fn load_at(path: &Path) -> Result<DirectorySnapshot, SnapshotError> {
    if !path.exists() {
        return Err(SnapshotError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
