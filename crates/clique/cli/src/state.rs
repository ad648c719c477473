//! State file handling
//!
//! The CLI keeps the whole store in one JSON snapshot. Commands load it,
//! run against an in-memory store and write it back if they changed it.

use crate::error::CliResult;
use clique_storage::{InMemoryCliqueStorage, StoreSnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A JSON snapshot on disk
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store; a missing file is an empty store
    pub fn load(&self) -> CliResult<Arc<InMemoryCliqueStorage>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "State file absent, starting empty");
            return Ok(Arc::new(InMemoryCliqueStorage::new()));
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&contents)?;
        Ok(Arc::new(InMemoryCliqueStorage::from_snapshot(snapshot)))
    }

    /// Write the store back, replacing the file atomically
    pub fn save(&self, storage: &InMemoryCliqueStorage) -> CliResult<()> {
        let snapshot = storage.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "State file written");
        Ok(())
    }
}
