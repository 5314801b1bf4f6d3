//! Command registry and dispatcher for pluggable hosts.
//!
//! Provides:
//! - Command descriptors and providers contributed by plugins
//! - An ordered registry with alias expansion and first-match lookup
//! - A dispatcher with caller restrictions and cancelable pre-execution hooks
//! - A reconciler merging saved command customizations with the live registry
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use cmdhub_core::{AllowedCaller, Caller, CommandRegistry, Dispatcher, FnCommand, Provider};
//!
//! let registry = Arc::new(CommandRegistry::new());
//! let owner = Provider::new("Moderation", "PluginManager");
//! let kick = FnCommand::new("kick", |_caller, _args| Ok(()))
//!     .with_aliases(["k"])
//!     .with_allowed_caller(AllowedCaller::Player);
//! registry.register(kick.into_dyn(), &owner).unwrap();
//!
//! let dispatcher = Dispatcher::new(registry);
//! assert!(!dispatcher.execute(None, "/kick 5"));
//! assert!(dispatcher.execute(Some(&Caller::player("1", "alice")), "k 5"));
//! ```

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod parse;
pub mod persist;
pub mod registry;
pub mod storage;

// Re-exports
pub use command::{
    AllowedCaller, Caller, CommandDescriptor, CommandProvider, DynCommand, FnCommand, Player,
    Provider,
};

pub use config::DispatcherConfig;

pub use dispatch::{DispatchOutcome, Dispatcher, FailureKind, HookId, PreExecuteHook, RejectReason};

pub use error::{CommandError, RegistryError};

pub use persist::{ReconcileReport, Reconciler};

pub use registry::{CommandRegistry, EntryKind, RegisteredCommand};

pub use storage::{
    CommandRecord, CommandSnapshot, MemorySnapshotStore, SnapshotStore, StorageError,
};
