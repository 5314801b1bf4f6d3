//! Merging persisted command customizations with the live registry.
//!
//! The saved list and the live registry are separate collections. A run
//! loads the saved list and heals duplicate identifiers and names in it.
//! Live entries adopt the saved name/help/syntax of their enabled counterpart;
//! entries with no saved record at all are appended and healed again. The
//! list is written back before any live entry is renamed.
//!
//! Conflict passes are split into a pure step computing which records to
//! disable and a step applying it, so nothing is mutated while it is scanned.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::command::Provider;
use crate::registry::{CommandRegistry, RegisteredCommand};
use crate::storage::{CommandRecord, CommandSnapshot, Result, SnapshotStore};

/// What a reconciliation run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Live entries that took over saved customizations
    pub adopted: usize,
    /// Live entries added to the saved list
    pub appended: usize,
    /// Saved records disabled for a duplicate identifier
    pub disabled_by_identifier: usize,
    /// Saved records disabled for a duplicate name
    pub disabled_by_name: usize,
}

/// Lowercase every record name.
pub fn normalize_names(records: &mut [CommandRecord]) {
    for record in records.iter_mut() {
        record.name = record.name.to_lowercase();
    }
}

/// Indices of enabled records that repeat the key of an earlier enabled
/// record. Disabled records are ignored.
pub fn conflicting_indices<F>(records: &[CommandRecord], key: F) -> Vec<usize>
where
    F: Fn(&CommandRecord) -> &str,
{
    let mut seen = HashSet::new();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.enabled)
        .filter(|(_, r)| !seen.insert(key(r).to_string()))
        .map(|(i, _)| i)
        .collect()
}

/// Disable the records at `indices`.
pub fn disable(records: &mut [CommandRecord], indices: &[usize]) {
    for &i in indices {
        records[i].enabled = false;
    }
}

/// Run both conflict passes: identifier first, then name.
///
/// Returns the number of records disabled by each pass.
pub fn resolve_conflicts(records: &mut [CommandRecord]) -> (usize, usize) {
    let by_identifier = conflicting_indices(records, |r| r.identifier.as_str());
    disable(records, &by_identifier);

    let by_name = conflicting_indices(records, |r| r.name.as_str());
    disable(records, &by_name);

    (by_identifier.len(), by_name.len())
}

/// Merge live entries into the saved records.
///
/// Returns the records each live identifier adopts, keyed by identifier,
/// along with the counts. A live entry whose identifier already has a saved
/// record, enabled or not, is never appended again. Appended records go
/// through the conflict passes too, so the result holds at most one enabled
/// record per identifier and per name.
pub fn merge(
    records: &mut Vec<CommandRecord>,
    live: &[RegisteredCommand],
) -> (HashMap<String, CommandRecord>, ReconcileReport) {
    normalize_names(records);
    let (mut disabled_by_identifier, mut disabled_by_name) = resolve_conflicts(records);

    let mut adoptions = HashMap::new();
    let mut adopted = 0;
    let mut appended = 0;
    for command in live {
        let enabled = records
            .iter()
            .find(|r| r.enabled && r.identifier == command.identifier)
            .cloned();

        match enabled {
            Some(record) => {
                adoptions.insert(command.identifier.clone(), record);
                adopted += 1;
            }
            None if records.iter().any(|r| r.identifier == command.identifier) => {}
            None => {
                let mut record = CommandRecord::from(command);
                record.name = record.name.to_lowercase();
                records.push(record);
                appended += 1;
            }
        }
    }

    if appended > 0 {
        let (by_identifier, by_name) = resolve_conflicts(records);
        disabled_by_identifier += by_identifier;
        disabled_by_name += by_name;
    }

    let report = ReconcileReport {
        adopted,
        appended,
        disabled_by_identifier,
        disabled_by_name,
    };
    (adoptions, report)
}

/// Keeps a provider's registry and its saved snapshot in step.
pub struct Reconciler {
    store: Arc<dyn SnapshotStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Merge the provider's saved snapshot into `registry` and save the
    /// merged list.
    ///
    /// The live registry is only renamed once the merged list has been
    /// saved; a failed save leaves it untouched.
    pub fn persist(&self, registry: &CommandRegistry, provider: &Provider) -> Result<ReconcileReport> {
        let key = provider.kind.as_str();
        let mut saved = self
            .store
            .load(key)?
            .unwrap_or_else(|| CommandSnapshot::new(key));
        saved.provider = key.to_string();

        let live = registry.snapshot();
        let (adoptions, report) = merge(&mut saved.commands, &live);

        self.store.save(key, &saved)?;

        registry.update(|live| {
            for command in live.iter_mut() {
                if let Some(record) = adoptions.get(command.identifier.as_str()) {
                    command.name = record.name.clone();
                    command.help = record.help.clone();
                    command.syntax = record.syntax.clone();
                }
            }
        });

        tracing::info!(
            category = "commands",
            provider = %provider.name,
            snapshot = %key,
            adopted = report.adopted,
            appended = report.appended,
            disabled_by_identifier = report.disabled_by_identifier,
            disabled_by_name = report.disabled_by_name,
            "Command snapshot reconciled"
        );

        Ok(report)
    }

    /// Clear the registry and forget the provider's saved customizations.
    pub fn reset(&self, registry: &CommandRegistry, provider: &Provider) -> Result<bool> {
        registry.reset_to_defaults();
        let existed = self.store.delete(&provider.kind)?;
        tracing::info!(
            category = "commands",
            provider = %provider.name,
            snapshot = %provider.kind,
            existed,
            "Command snapshot reset to defaults"
        );
        Ok(existed)
    }
}
