//! Ordered registry of dispatchable commands.
//!
//! Every descriptor handed to [`CommandRegistry::register`] becomes one
//! [`RegisteredCommand`] for its canonical name plus one per alias. Entries
//! are never removed individually: conflicts are settled by disabling, and
//! lookups only ever see enabled entries.
//!
//! The backing collection is an `Arc<Vec<_>>` behind a read-mostly lock.
//! Writers copy on write and swap; readers take a cheap clone of the `Arc`,
//! so iteration never observes a half-applied mutation.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::command::{AllowedCaller, CommandProvider, DynCommand, Provider};
use crate::error::RegistryError;

/// Whether an entry was created for a canonical name or an alias.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EntryKind {
    #[default]
    Primary,
    Alias,
}

/// A descriptor bound to a dispatch name and its persisted metadata.
#[derive(Clone)]
pub struct RegisteredCommand {
    /// Owning provider name
    pub owner: String,
    /// Dispatch key
    pub name: String,
    /// Stable cross-restart key
    pub identifier: String,
    /// Disabled entries are kept but never resolved
    pub enabled: bool,
    /// Help override
    pub help: Option<String>,
    /// Syntax override
    pub syntax: Option<String>,
    /// Primary or alias
    pub kind: EntryKind,
    descriptor: DynCommand,
}

impl RegisteredCommand {
    /// Create an enabled entry for `name`, which must be the descriptor's
    /// name or one of its aliases.
    pub fn new(owner: &Provider, name: impl Into<String>, descriptor: DynCommand) -> Self {
        let name = name.into();
        let kind = if name == descriptor.name() {
            EntryKind::Primary
        } else {
            EntryKind::Alias
        };
        let identifier = identifier_for(owner, descriptor.source(), &name);
        Self {
            owner: owner.name.clone(),
            name,
            identifier,
            enabled: true,
            help: None,
            syntax: None,
            kind,
            descriptor,
        }
    }

    /// The underlying descriptor.
    pub fn descriptor(&self) -> &DynCommand {
        &self.descriptor
    }

    pub fn allowed_caller(&self) -> AllowedCaller {
        self.descriptor.allowed_caller()
    }

    /// Help text: the customized override, else the descriptor's default.
    pub fn help(&self) -> &str {
        self.help
            .as_deref()
            .unwrap_or_else(|| self.descriptor.help())
    }

    /// Syntax text: the customized override, else the descriptor's default.
    pub fn syntax(&self) -> &str {
        self.syntax
            .as_deref()
            .unwrap_or_else(|| self.descriptor.syntax())
    }

    /// Identifier prefix shared by a descriptor's primary and alias entries.
    ///
    /// Registered names never contain `.`, so the family ends at the last one.
    pub fn family(&self) -> &str {
        self.identifier
            .rsplit_once('.')
            .map(|(family, _)| family)
            .unwrap_or(&self.identifier)
    }

    /// Case-insensitive name comparison.
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("enabled", &self.enabled)
            .field("help", &self.help)
            .field("syntax", &self.syntax)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Build the identifier `"{owner}.{source}.{name}"`.
pub fn identifier_for(owner: &Provider, source: &str, name: &str) -> String {
    format!("{}.{}.{}", owner.name, source, name)
}

/// Insertion-ordered collection of registered commands.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<Arc<Vec<RegisteredCommand>>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. No uniqueness check is made.
    pub fn add(&self, entry: RegisteredCommand) {
        let mut commands = self.commands.write();
        Arc::make_mut(&mut commands).push(entry);
    }

    /// Register a descriptor under its canonical name and every alias.
    ///
    /// Returns the number of entries added.
    pub fn register(&self, descriptor: DynCommand, owner: &Provider) -> Result<usize, RegistryError> {
        let name = descriptor.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidDescriptor(format!(
                "command from provider '{}' has an empty name",
                owner.name
            )));
        }
        if name.contains('.') {
            return Err(RegistryError::InvalidDescriptor(format!(
                "command name '{}' must not contain '.'",
                name
            )));
        }

        let primary = RegisteredCommand::new(owner, name.clone(), descriptor.clone());
        let family = primary.family().to_string();
        tracing::info!(
            category = "commands",
            identifier = %primary.identifier,
            "[registered] /{} ({})",
            name,
            family
        );

        let mut entries = vec![primary];
        let mut seen = vec![name.to_lowercase()];
        for alias in descriptor.aliases() {
            let key = alias.to_lowercase();
            if alias.trim().is_empty() || alias.contains('.') || seen.contains(&key) {
                tracing::warn!(
                    category = "commands",
                    command = %name,
                    alias = %alias,
                    "Skipping empty, dotted or duplicate alias"
                );
                continue;
            }
            seen.push(key);

            let entry = RegisteredCommand::new(owner, alias.clone(), descriptor.clone());
            tracing::info!(
                category = "commands",
                identifier = %entry.identifier,
                "[registered alias] /{} ({})",
                alias,
                family
            );
            entries.push(entry);
        }

        let added = entries.len();
        let mut commands = self.commands.write();
        Arc::make_mut(&mut commands).extend(entries);
        Ok(added)
    }

    /// Register each descriptor in order.
    ///
    /// An invalid descriptor is logged and skipped; the rest still register.
    pub fn register_all<I>(&self, descriptors: I, owner: &Provider) -> usize
    where
        I: IntoIterator<Item = DynCommand>,
    {
        let mut added = 0;
        for descriptor in descriptors {
            match self.register(descriptor, owner) {
                Ok(n) => added += n,
                Err(e) => tracing::error!(
                    category = "commands",
                    provider = %owner.name,
                    error = %e,
                    "Failed to register command"
                ),
            }
        }
        added
    }

    /// Register everything a provider contributes.
    pub fn load_provider(&self, provider: &dyn CommandProvider) -> usize {
        let owner = provider.provider();
        self.register_all(provider.commands(), &owner)
    }

    /// Find the first enabled entry whose name matches, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<RegisteredCommand> {
        self.snapshot()
            .iter()
            .find(|c| c.enabled && c.matches(name))
            .cloned()
    }

    /// Drop every entry.
    pub fn reset_to_defaults(&self) {
        *self.commands.write() = Arc::new(Vec::new());
    }

    /// Immutable view of all entries, disabled ones included.
    pub fn snapshot(&self) -> Arc<Vec<RegisteredCommand>> {
        self.commands.read().clone()
    }

    /// Iterate over all entries in insertion order.
    ///
    /// The iterator walks the snapshot taken at call time; calling again
    /// restarts from the first entry.
    pub fn iter(&self) -> impl Iterator<Item = RegisteredCommand> {
        let snapshot = self.snapshot();
        (0..snapshot.len()).map(move |i| snapshot[i].clone())
    }

    /// Entries owned by the given provider name.
    pub fn owned_by(&self, owner: &str) -> Vec<RegisteredCommand> {
        self.snapshot()
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect()
    }

    /// Apply `f` to the collection and swap the result in.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut Vec<RegisteredCommand>) -> R) -> R {
        let mut commands = self.commands.write();
        f(Arc::make_mut(&mut commands))
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Number of entries visible to lookup.
    pub fn enabled_count(&self) -> usize {
        self.commands.read().iter().filter(|c| c.enabled).count()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.snapshot())
            .finish()
    }
}
