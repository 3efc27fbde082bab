//! Persistence collaborator
//!
//! The core treats persistence as an opaque injected store: one snapshot
//! holding reminders, the conversation log, and session flags, read at
//! startup and written after each mutation. No schema is imposed beyond
//! the entity shapes themselves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::ConversationLog;
use crate::reminders::ReminderSet;
use crate::{Error, Result};

/// Everything the assistant persists between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub reminders: ReminderSet,

    #[serde(default)]
    pub conversation: ConversationLog,

    /// Whether the time-of-day startup greeting was already spoken
    #[serde(default)]
    pub greeting_spoken: bool,
}

/// Opaque persistence store
pub trait Store: Send + Sync {
    /// Load the persisted snapshot, or a default when none exists
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreadable or corrupt
    fn load(&self) -> Result<Snapshot>;

    /// Persist the snapshot
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot cannot be written
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// JSON file store under the platform data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store location inside `data_dir`
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("assistant.json"))
    }

    /// The file backing this store
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&raw)?;
        tracing::debug!(path = %self.path.display(), "snapshot loaded");
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, raw)
            .map_err(|e| Error::Store(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }
}
