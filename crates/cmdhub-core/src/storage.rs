//! Snapshot storage abstractions.
//!
//! The reconciler reads and writes one [`CommandSnapshot`] per provider kind
//! through a [`SnapshotStore`]. Durable backends live in `cmdhub-storage`;
//! [`MemorySnapshotStore`] keeps serialized snapshots in process memory.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::registry::{EntryKind, RegisteredCommand};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend error.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Other error.
    #[error("Storage error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Persisted view of one registered command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandRecord {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub syntax: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Owning provider name
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub kind: EntryKind,
}

fn default_enabled() -> bool {
    true
}

impl From<&RegisteredCommand> for CommandRecord {
    fn from(command: &RegisteredCommand) -> Self {
        Self {
            identifier: command.identifier.clone(),
            name: command.name.clone(),
            help: command.help.clone(),
            syntax: command.syntax.clone(),
            enabled: command.enabled,
            owner: command.owner.clone(),
            kind: command.kind,
        }
    }
}

/// Saved command list for one provider kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandSnapshot {
    /// Provider kind the snapshot belongs to
    pub provider: String,
    #[serde(default)]
    pub commands: Vec<CommandRecord>,
}

impl CommandSnapshot {
    /// Create an empty snapshot.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            commands: Vec::new(),
        }
    }

    /// Serialize to the pretty JSON document format shared by the backends.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Backend for reading and writing command snapshots, keyed by provider kind.
pub trait SnapshotStore: Send + Sync {
    /// Load a snapshot. `Ok(None)` when nothing was saved yet.
    fn load(&self, key: &str) -> Result<Option<CommandSnapshot>>;

    /// Replace the snapshot stored under `key`.
    fn save(&self, key: &str, snapshot: &CommandSnapshot) -> Result<()>;

    /// Remove a snapshot. Returns whether one existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Check if this backend survives a restart.
    fn is_persistent(&self) -> bool;
}

/// In-memory snapshot store.
///
/// Snapshots are held as serialized JSON so that loads return fresh copies,
/// as a file-backed store would.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, for comparing writes byte for byte.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.snapshots.read().get(key).cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<CommandSnapshot>> {
        match self.snapshots.read().get(key) {
            Some(data) => Ok(Some(CommandSnapshot::from_json(data)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, snapshot: &CommandSnapshot) -> Result<()> {
        let data = snapshot.to_json()?;
        self.snapshots.write().insert(key.to_string(), data);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.snapshots.write().remove(key).is_some())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}
