//! JSON file snapshot store.
//!
//! Each provider kind gets its own document, `commands.{kind}.json`, inside
//! the configured directory. Saves write a sibling temp file and rename it
//! over the target so readers never see a partial document.

use std::fs;
use std::path::{Path, PathBuf};

use cmdhub_core::config;
use cmdhub_core::storage::{CommandSnapshot, Result as CoreResult, SnapshotStore};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for JsonFileSnapshotStore.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonStoreConfig {
    /// Directory holding the snapshot files.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Create the directory if it doesn't exist.
    #[serde(default = "default_create_dirs")]
    pub create_dirs: bool,
}

fn default_dir() -> String {
    config::snapshot_dir().to_string_lossy().to_string()
}

fn default_create_dirs() -> bool {
    true
}

impl Default for JsonStoreConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            create_dirs: true,
        }
    }
}

impl JsonStoreConfig {
    /// Create a new config with the given directory.
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            create_dirs: true,
        }
    }

    /// Set whether to create the directory.
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

/// Snapshot store writing one JSON document per provider kind.
#[derive(Debug)]
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    /// Create a store with the given configuration.
    pub fn new(config: JsonStoreConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.dir);
        if config.create_dirs {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    /// Open a store rooted at `dir`, creating it if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::new(JsonStoreConfig::new(
            dir.as_ref().to_string_lossy().to_string(),
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a provider kind.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(config::snapshot_file_name(key)))
    }

    fn read(&self, key: &str) -> Result<Option<CommandSnapshot>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        Ok(Some(CommandSnapshot::from_json(&data)?))
    }

    fn write(&self, key: &str, snapshot: &CommandSnapshot) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, snapshot.to_json()?)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(
            category = "storage",
            path = %path.display(),
            commands = snapshot.commands.len(),
            "Command snapshot written"
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keys become file names, so path separators and parent references are refused.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("snapshot key cannot be empty".to_string()));
    }
    if key.contains(['/', '\\']) || key.contains("..") {
        return Err(Error::InvalidInput(format!(
            "snapshot key '{}' must not contain path components",
            key
        )));
    }
    Ok(())
}

impl SnapshotStore for JsonFileSnapshotStore {
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
