//! Command dispatch.
//!
//! One call to [`Dispatcher::dispatch`] walks a single line through
//! `Parsed → Resolved → Authorized → hooks → Executed`. Nothing raised by a
//! hook or a command body escapes the call; command failures end up in the
//! returned [`DispatchOutcome`].

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::command::{AllowedCaller, Caller};
use crate::config::DispatcherConfig;
use crate::error::CommandError;
use crate::parse::parse_line;
use crate::registry::{CommandRegistry, RegisteredCommand};

/// Pre-execution observer. Setting the flag to `true` cancels the command.
pub type PreExecuteHook =
    Arc<dyn Fn(&Caller, &RegisteredCommand, &mut bool) -> anyhow::Result<()> + Send + Sync>;

/// Handle returned by [`Dispatcher::add_hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// Why an authorized-looking call was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A player-only command was called from the console.
    PlayerOnly,
    /// A console-only command was called by a player.
    ConsoleOnly,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PlayerOnly => write!(f, "This command can't be called from console"),
            RejectReason::ConsoleOnly => write!(f, "This command can only be called from console"),
        }
    }
}

/// How a failed execution was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    Usage,
    Unknown,
}

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing enabled answers to the parsed name, or the line was empty.
    NoMatch,
    /// The caller type does not fit the command's restriction.
    Rejected(RejectReason),
    /// A hook set the cancel flag; the body never ran.
    Canceled,
    Succeeded,
    Failed(FailureKind),
}

impl DispatchOutcome {
    /// The boolean reported by [`Dispatcher::execute`].
    ///
    /// `Rejected` reports `false` like `NoMatch`, even though a command was
    /// resolved.
    pub fn handled(&self) -> bool {
        !matches!(self, DispatchOutcome::NoMatch | DispatchOutcome::Rejected(_))
    }
}

/// Resolves and runs command lines against a registry.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    hooks: RwLock<Vec<(HookId, PreExecuteHook)>>,
    next_hook_id: AtomicU64,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration.
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    pub fn with_config(registry: Arc<CommandRegistry>, config: DispatcherConfig) -> Self {
        Self {
            registry,
            hooks: RwLock::new(Vec::new()),
            next_hook_id: AtomicU64::new(1),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Register a pre-execution hook. Hooks run in registration order.
    pub fn add_hook<F>(&self, hook: F) -> HookId
    where
        F: Fn(&Caller, &RegisteredCommand, &mut bool) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = HookId(self.next_hook_id.fetch_add(1, Ordering::Relaxed));
        self.hooks.write().push((id, Arc::new(hook)));
        id
    }

    /// Remove a hook. Returns `false` if it was not registered.
    pub fn remove_hook(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.read().len()
    }

    /// Run a command line. Returns `true` iff a command was resolved, the
    /// caller passed the restriction check, and an attempt was made.
    pub fn execute(&self, caller: Option<&Caller>, input: &str) -> bool {
        self.dispatch(caller, input).handled()
    }

    /// Run a command line and report the terminal state.
    pub fn dispatch(&self, caller: Option<&Caller>, input: &str) -> DispatchOutcome {
        let Some(line) = parse_line(input, self.config.prefix) else {
            return DispatchOutcome::NoMatch;
        };

        let console = Caller::Console;
        let caller = caller.unwrap_or(&console);

        let Some(command) = self.registry.lookup(&line.name) else {
            tracing::debug!(category = "commands", command = %line.name, "No such command");
            return DispatchOutcome::NoMatch;
        };

        if let Some(reason) = check_caller(command.allowed_caller(), caller) {
            tracing::warn!(
                category = "commands",
                command = %command.name,
                caller = %caller,
                "{}",
                reason
            );
            return DispatchOutcome::Rejected(reason);
        }

        if self.run_hooks(caller, &command, &line.args) {
            tracing::info!(
                category = "commands",
                command = %command.name,
                caller = %caller,
                "Command canceled by pre-execution hook"
            );
            return DispatchOutcome::Canceled;
        }

        let outcome = self.invoke(caller, &command, &line.args);
        tracing::info!(
            category = "commands",
            command = %command.name,
            caller = %caller,
            args = ?line.args,
            outcome = ?outcome,
            "Command handled"
        );
        outcome
    }

    /// Fan out to every hook. Returns the final cancel flag.
    fn run_hooks(&self, caller: &Caller, command: &RegisteredCommand, args: &[String]) -> bool {
        // Snapshot so hooks may add or remove hooks.
        let hooks: Vec<(HookId, PreExecuteHook)> = self.hooks.read().clone();

        let mut cancel = false;
        for (id, hook) in hooks {
            let result = catch_unwind(AssertUnwindSafe(|| (*hook)(caller, command, &mut cancel)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(
                    category = "commands",
                    hook = id.0,
                    command = %command.name,
                    args = ?args,
                    error = %e,
                    "Pre-execution hook failed"
                ),
                Err(payload) => tracing::error!(
                    category = "commands",
                    hook = id.0,
                    command = %command.name,
                    args = ?args,
                    error = %panic_message(payload.as_ref()),
                    "Pre-execution hook panicked"
                ),
            }
        }
        cancel
    }

    fn invoke(&self, caller: &Caller, command: &RegisteredCommand, args: &[String]) -> DispatchOutcome {
        let descriptor = command.descriptor();
        let result = catch_unwind(AssertUnwindSafe(|| descriptor.execute(caller, args)));

        match result {
            Ok(Ok(())) => DispatchOutcome::Succeeded,
            Ok(Err(CommandError::PermissionDenied(message))) => {
                tracing::warn!(
                    category = "commands",
                    command = %command.name,
                    caller = %caller,
                    "{}",
                    message
                );
                DispatchOutcome::Failed(FailureKind::PermissionDenied)
            }
            Ok(Err(CommandError::Usage(message))) => {
                tracing::info!(
                    category = "commands",
                    command = %command.name,
                    caller = %caller,
                    "{}",
                    message
                );
                DispatchOutcome::Failed(FailureKind::Usage)
            }
            Ok(Err(CommandError::Failed(e))) => {
                tracing::error!(
                    category = "commands",
                    caller = %caller,
                    error = ?e,
                    "An error occurred while executing {} [{}]",
                    descriptor.name(),
                    args.join(", ")
                );
                DispatchOutcome::Failed(FailureKind::Unknown)
            }
            Err(payload) => {
                tracing::error!(
                    category = "commands",
                    caller = %caller,
                    error = %panic_message(payload.as_ref()),
                    "An error occurred while executing {} [{}]",
                    descriptor.name(),
                    args.join(", ")
                );
                DispatchOutcome::Failed(FailureKind::Unknown)
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("hooks", &self.hook_count())
            .field("config", &self.config)
            .finish()
    }
}

fn check_caller(allowed: AllowedCaller, caller: &Caller) -> Option<RejectReason> {
    if allowed.permits(caller) {
        return None;
    }
    match allowed {
        AllowedCaller::Player => Some(RejectReason::PlayerOnly),
        AllowedCaller::Console => Some(RejectReason::ConsoleOnly),
        AllowedCaller::Any => None,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
