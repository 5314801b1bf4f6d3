//! Snapshot store tests.
//!
//! Tests the durable backends directly and through the reconciler across a
//! simulated restart.

use std::sync::Arc;

use cmdhub_core::{
    CommandRecord, CommandRegistry, CommandSnapshot, EntryKind, FnCommand, Provider, Reconciler,
    SnapshotStore,
};
use cmdhub_storage::{create_store, JsonFileSnapshotStore, JsonStoreConfig};
use tempfile::TempDir;

const KIND: &str = "PluginManager";

fn owner() -> Provider {
    Provider::new("Moderation", KIND)
}

fn sample_snapshot() -> CommandSnapshot {
    let mut snapshot = CommandSnapshot::new(KIND);
    snapshot.commands.push(CommandRecord {
        identifier: "Moderation.moderation.kick".to_string(),
        name: "boot".to_string(),
        help: Some("Remove a player".to_string()),
        syntax: Some("<player>".to_string()),
        enabled: true,
        owner: "Moderation".to_string(),
        kind: EntryKind::Primary,
    });
    snapshot.commands.push(CommandRecord {
        identifier: "Moderation.moderation.k".to_string(),
        name: "k".to_string(),
        help: None,
        syntax: None,
        enabled: false,
        owner: "Moderation".to_string(),
        kind: EntryKind::Alias,
    });
    snapshot
}

fn live_registry() -> CommandRegistry {
    let registry = CommandRegistry::new();
    registry
        .register(
            FnCommand::new("kick", |_, _| Ok(()))
                .with_aliases(["k"])
                .with_source("moderation")
                .into_dyn(),
            &owner(),
        )
        .unwrap();
    registry
}

/// Shared behavior every durable backend must show.
fn exercise_store(store: &dyn SnapshotStore) {
    assert!(store.load(KIND).unwrap().is_none());

    let snapshot = sample_snapshot();
    store.save(KIND, &snapshot).unwrap();
    assert_eq!(store.load(KIND).unwrap(), Some(snapshot.clone()));

    // Saving again replaces the previous document.
    let mut smaller = snapshot;
    smaller.commands.truncate(1);
    store.save(KIND, &smaller).unwrap();
    assert_eq!(store.load(KIND).unwrap(), Some(smaller));

    assert!(store.delete(KIND).unwrap());
    assert!(!store.delete(KIND).unwrap());
    assert!(store.load(KIND).unwrap().is_none());
    assert!(store.is_persistent());
}

#[test]
fn test_json_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileSnapshotStore::open(dir.path()).unwrap();
    exercise_store(&store);
}

#[test]
fn test_json_store_file_layout() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileSnapshotStore::open(dir.path()).unwrap();
    store.save(KIND, &sample_snapshot()).unwrap();

    let path = dir.path().join("commands.PluginManager.json");
    assert!(path.exists());
    assert!(!dir.path().join("commands.PluginManager.json.tmp").exists());

    let doc: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(doc["provider"], KIND);
    assert_eq!(doc["commands"][0]["name"], "boot");
    assert_eq!(doc["commands"][1]["kind"], "Alias");
}

#[test]
fn test_json_store_rejects_path_keys() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileSnapshotStore::open(dir.path()).unwrap();
    assert!(store.save("../escape", &sample_snapshot()).is_err());
}

#[test]
fn test_json_store_without_create_dirs() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");
    let config = JsonStoreConfig::new(missing.to_string_lossy()).with_create_dirs(false);
    let store = JsonFileSnapshotStore::new(config).unwrap();

    assert!(store.load(KIND).unwrap().is_none());
    assert!(store.save(KIND, &sample_snapshot()).is_err());
}

#[cfg(feature = "redb")]
#[test]
fn test_redb_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = cmdhub_storage::RedbSnapshotStore::open(dir.path().join("db/commands.redb")).unwrap();
    exercise_store(&store);
}

#[test]
fn test_customizations_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = serde_json::json!({ "dir": dir.path().to_string_lossy() });

    // First boot: plugin registers, snapshot gets written.
    {
        let store = create_store("json", &config).unwrap();
        let registry = live_registry();
        let report = Reconciler::new(store).persist(&registry, &owner()).unwrap();
        assert_eq!(report.appended, 2);
    }

    // An administrator renames the command in the saved document.
    {
        let store = JsonFileSnapshotStore::open(dir.path()).unwrap();
        let mut saved = store.load(KIND).unwrap().unwrap();
        saved.commands[0].name = "Boot".to_string();
        saved.commands[0].help = Some("Remove a player".to_string());
        store.save(KIND, &saved).unwrap();
    }

    // Second boot: the rename is adopted by the freshly registered command.
    let store: Arc<dyn SnapshotStore> = create_store("json", &config).unwrap();
    let registry = live_registry();
    let report = Reconciler::new(store.clone()).persist(&registry, &owner()).unwrap();

    assert_eq!(report.adopted, 2);
    assert_eq!(report.appended, 0);
    let entry = registry.lookup("boot").unwrap();
    assert_eq!(entry.help(), "Remove a player");
    assert!(registry.lookup("kick").is_none());

    let saved = store.load(KIND).unwrap().unwrap();
    assert_eq!(saved.commands[0].name, "boot");
}
