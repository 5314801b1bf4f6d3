//! Durable snapshot stores for cmdhub.
//!
//! Implementations of [`cmdhub_core::SnapshotStore`]:
//! - `json`: one JSON document per provider kind in a directory
//! - `redb`: a redb database table (feature `redb`, on by default)
//! - `memory`: the non-durable store from `cmdhub-core`

pub mod error;
pub mod json;
#[cfg(feature = "redb")]
pub mod redb;

use std::sync::Arc;

use cmdhub_core::storage::{MemorySnapshotStore, SnapshotStore, StorageError};
use serde_json::Value;

pub use error::{Error, Result};
pub use json::{JsonFileSnapshotStore, JsonStoreConfig};
#[cfg(feature = "redb")]
pub use crate::redb::{RedbSnapshotStore, RedbStoreConfig};

/// Create a snapshot store by type identifier.
///
/// # Example
/// ```no_run
/// use cmdhub_storage::create_store;
/// use serde_json::json;
///
/// # fn main() -> anyhow::Result<()> {
/// let store = create_store("json", &json!({ "dir": "./data/commands" }))?;
/// assert!(store.is_persistent());
/// # Ok(())
/// # }
/// ```
pub fn create_store(
    backend_type: &str,
    config: &Value,
) -> cmdhub_core::storage::Result<Arc<dyn SnapshotStore>> {
    match backend_type {
        "json" => {
            let cfg: JsonStoreConfig = serde_json::from_value(config.clone()).map_err(|e| {
                StorageError::Configuration(format!("Invalid json store config: {}", e))
            })?;
            Ok(Arc::new(JsonFileSnapshotStore::new(cfg)?))
        }

        #[cfg(feature = "redb")]
        "redb" => {
            let cfg: RedbStoreConfig = serde_json::from_value(config.clone()).map_err(|e| {
                StorageError::Configuration(format!("Invalid redb store config: {}", e))
            })?;
            Ok(Arc::new(RedbSnapshotStore::new(cfg)?))
        }

        "memory" => Ok(Arc::new(MemorySnapshotStore::new())),

        _ => Err(StorageError::Configuration(format!(
            "Unknown snapshot backend: {}. Available backends: {}",
            backend_type,
            available_backends().join(", ")
        ))),
    }
}

/// Create the store named by `CMDHUB_SNAPSHOT_BACKEND`, rooted at
/// `CMDHUB_SNAPSHOT_DIR`.
pub fn create_store_from_env() -> cmdhub_core::storage::Result<Arc<dyn SnapshotStore>> {
    let backend = cmdhub_core::config::snapshot_backend();
    let dir = cmdhub_core::config::snapshot_dir();
    let config = match backend.as_str() {
        "redb" => serde_json::json!({
            "path": dir.join("commands.redb").to_string_lossy(),
        }),
        _ => serde_json::json!({ "dir": dir.to_string_lossy() }),
    };
    tracing::info!(category = "storage", backend = %backend, dir = %dir.display(), "Opening command snapshot store");
    create_store(&backend, &config)
}

/// Get list of available backend types (based on enabled features).
pub fn available_backends() -> Vec<&'static str> {
    let mut backends = vec!["json"];
    #[cfg(feature = "redb")]
    backends.push("redb");
    backends.push("memory");
    backends
}
