//! Command registry tests.
//!
//! Tests registration, alias expansion, lookup order and providers.

use std::sync::Arc;

use cmdhub_core::{
    AllowedCaller, Caller, CommandDescriptor, CommandError, CommandProvider, CommandRegistry,
    DynCommand, EntryKind, FnCommand, Provider, RegisteredCommand,
};

struct Teleport;

impl CommandDescriptor for Teleport {
    fn name(&self) -> &str {
        "tp"
    }

    fn aliases(&self) -> Vec<String> {
        vec!["teleport".to_string(), "warp".to_string()]
    }

    fn allowed_caller(&self) -> AllowedCaller {
        AllowedCaller::Player
    }

    fn syntax(&self) -> &str {
        "<player> [target]"
    }

    fn execute(&self, _caller: &Caller, args: &[String]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::usage("/tp <player> [target]"));
        }
        Ok(())
    }
}

struct TravelPlugin;

impl CommandProvider for TravelPlugin {
    fn provider(&self) -> Provider {
        Provider::new("Travel", "PluginManager")
    }

    fn commands(&self) -> Vec<DynCommand> {
        vec![
            Arc::new(Teleport) as DynCommand,
            FnCommand::new("home", |_, _| Ok(())).into_dyn(),
        ]
    }
}

fn owner(name: &str) -> Provider {
    Provider::new(name, "PluginManager")
}

#[test]
fn test_alias_expansion_shares_family() {
    let registry = CommandRegistry::new();
    let added = registry.register(Arc::new(Teleport), &owner("Travel")).unwrap();

    assert_eq!(added, 3);
    let entries: Vec<RegisteredCommand> = registry.iter().collect();
    let names: Vec<&str> = entries.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["tp", "teleport", "warp"]);

    let family = entries[0].family().to_string();
    assert!(entries.iter().all(|c| c.family() == family));
    assert!(entries.iter().all(|c| c.owner == "Travel"));
    assert!(entries.iter().all(|c| c.enabled));
    assert_eq!(entries[0].kind, EntryKind::Primary);
    assert!(entries[1..].iter().all(|c| c.kind == EntryKind::Alias));

    // Distinct identifiers per entry
    assert_ne!(entries[0].identifier, entries[1].identifier);
    assert_ne!(entries[1].identifier, entries[2].identifier);
    assert_eq!(entries[0].identifier, format!("{}.tp", family));
}

#[test]
fn test_default_source_uses_defining_crate() {
    let registry = CommandRegistry::new();
    registry.register(Arc::new(Teleport), &owner("Travel")).unwrap();

    // Integration tests compile as their own crate.
    let entry = registry.lookup("tp").unwrap();
    assert_eq!(entry.identifier, "Travel.registry_test.tp");
}

#[test]
fn test_register_all_preserves_order() {
    let registry = CommandRegistry::new();
    let descriptors = vec![
        FnCommand::new("b", |_, _| Ok(())).into_dyn(),
        FnCommand::new("a", |_, _| Ok(())).with_aliases(["aa"]).into_dyn(),
        FnCommand::new("", |_, _| Ok(())).into_dyn(),
        FnCommand::new("c", |_, _| Ok(())).into_dyn(),
    ];

    let added = registry.register_all(descriptors, &owner("Misc"));

    assert_eq!(added, 4);
    let names: Vec<String> = registry.iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["b", "a", "aa", "c"]);
}

#[test]
fn test_lookup_first_registered_wins() {
    let registry = CommandRegistry::new();
    registry
        .register(FnCommand::new("spawn", |_, _| Ok(())).into_dyn(), &owner("First"))
        .unwrap();
    registry
        .register(FnCommand::new("Spawn", |_, _| Ok(())).into_dyn(), &owner("Second"))
        .unwrap();

    assert_eq!(registry.lookup("SPAWN").unwrap().owner, "First");
}

#[test]
fn test_lookup_skips_disabled() {
    let registry = CommandRegistry::new();
    let first = FnCommand::new("spawn", |_, _| Ok(())).into_dyn();
    let second = FnCommand::new("spawn", |_, _| Ok(())).into_dyn();

    let mut disabled = RegisteredCommand::new(&owner("First"), "spawn", first);
    disabled.enabled = false;
    registry.add(disabled);
    registry.add(RegisteredCommand::new(&owner("Second"), "spawn", second));

    assert_eq!(registry.lookup("spawn").unwrap().owner, "Second");
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.enabled_count(), 1);
}

#[test]
fn test_iteration_includes_disabled_and_restarts() {
    let registry = CommandRegistry::new();
    let mut entry =
        RegisteredCommand::new(&owner("A"), "x", FnCommand::new("x", |_, _| Ok(())).into_dyn());
    entry.enabled = false;
    registry.add(entry);
    registry.register(FnCommand::new("y", |_, _| Ok(())).into_dyn(), &owner("A")).unwrap();

    assert_eq!(registry.iter().count(), 2);
    assert_eq!(registry.iter().count(), 2);
    assert!(registry.lookup("x").is_none());
}

#[test]
fn test_reset_to_defaults() {
    let registry = CommandRegistry::new();
    registry.register(Arc::new(Teleport), &owner("Travel")).unwrap();
    assert!(!registry.is_empty());

    registry.reset_to_defaults();
    assert!(registry.is_empty());
    assert!(registry.lookup("tp").is_none());
}

#[test]
fn test_repeated_loads_accumulate() {
    let registry = CommandRegistry::new();
    assert_eq!(registry.load_provider(&TravelPlugin), 4);
    assert_eq!(registry.load_provider(&TravelPlugin), 4);

    assert_eq!(registry.len(), 8);
    assert_eq!(registry.owned_by("Travel").len(), 8);
    assert!(registry.owned_by("Nobody").is_empty());
}

#[test]
fn test_entry_exposes_descriptor_metadata() {
    let registry = CommandRegistry::new();
    registry.load_provider(&TravelPlugin);

    let entry = registry.lookup("warp").unwrap();
    assert_eq!(entry.allowed_caller(), AllowedCaller::Player);
    assert_eq!(entry.syntax(), "<player> [target]");
    assert_eq!(entry.descriptor().name(), "tp");
    assert!(entry
        .descriptor()
        .execute(&Caller::Console, &[])
        .is_err());
}
