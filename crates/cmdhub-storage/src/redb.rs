//! Redb snapshot store.
//!
//! Snapshots share one table keyed by provider kind; values are the same
//! JSON documents the file store writes.

use std::path::Path;
use std::sync::Arc;

use cmdhub_core::storage::{CommandSnapshot, Result as CoreResult, SnapshotStore};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// Snapshots table: key = provider kind, value = CommandSnapshot (JSON)
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("command_snapshots");

/// Configuration for RedbSnapshotStore.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedbStoreConfig {
    /// Path to the database file.
    pub path: String,

    /// Create parent directories if they don't exist.
    #[serde(default = "default_create_dirs")]
    pub create_dirs: bool,
}

fn default_create_dirs() -> bool {
    true
}

impl RedbStoreConfig {
    /// Create a new config with the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            create_dirs: true,
        }
    }

    /// Set whether to create parent directories.
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

/// Snapshot store backed by a redb database.
pub struct RedbSnapshotStore {
    db: Arc<Database>,
    /// Path to the database file
    path: String,
}

impl RedbSnapshotStore {
    /// Open or create the database described by `config`.
    pub fn new(config: RedbStoreConfig) -> Result<Self> {
        let path_ref = Path::new(&config.path);
        if config.create_dirs {
            if let Some(parent) = path_ref.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = if path_ref.exists() {
            Database::open(path_ref)?
        } else {
            Database::create(path_ref)?
        };

        let store = Self {
            db: Arc::new(db),
            path: config.path,
        };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Open or create a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(RedbStoreConfig::new(
            path.as_ref().to_string_lossy().to_string(),
        ))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Ensure all required tables exist
    fn ensure_tables(&self) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<CommandSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(key)? {
            Some(data) => Ok(Some(CommandSnapshot::from_json(data.value())?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, snapshot: &CommandSnapshot) -> Result<()> {
        let value = snapshot.to_json()?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNAPSHOTS_TABLE)?;
            table.insert(key, value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }
}

impl SnapshotStore for RedbSnapshotStore {
    fn load(&self, key: &str) -> CoreResult<Option<CommandSnapshot>> {
        Ok(self.read(key)?)
    }

    fn save(&self, key: &str, snapshot: &CommandSnapshot) -> CoreResult<()> {
        Ok(self.write(key, snapshot)?)
    }

    fn delete(&self, key: &str) -> CoreResult<bool> {
        Ok(self.remove(key)?)
    }

    fn is_persistent(&self) -> bool {
        true
    }
}
