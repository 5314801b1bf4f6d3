//! Command descriptors, callers and providers.
//!
//! Plugins implement [`CommandDescriptor`] for each command they contribute
//! and hand them to the registry through a [`CommandProvider`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// Which kind of caller may run a command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AllowedCaller {
    /// Players and the console.
    #[default]
    Any,
    /// Interactive players only.
    Player,
    /// The console only.
    Console,
}

impl AllowedCaller {
    /// Check whether `caller` satisfies this restriction.
    pub fn permits(&self, caller: &Caller) -> bool {
        match self {
            AllowedCaller::Any => true,
            AllowedCaller::Player => !caller.is_console(),
            AllowedCaller::Console => caller.is_console(),
        }
    }
}

/// Interactive caller identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Player {
    /// Stable player ID
    pub id: String,
    /// Display name
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Whoever issued a command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Caller {
    /// The non-interactive administrative caller. Has no player identity.
    #[default]
    Console,
    /// An interactive player.
    Player(Player),
}

impl Caller {
    /// Shorthand for `Caller::Player(Player::new(id, name))`.
    pub fn player(id: impl Into<String>, name: impl Into<String>) -> Self {
        Caller::Player(Player::new(id, name))
    }

    pub fn is_console(&self) -> bool {
        matches!(self, Caller::Console)
    }

    /// Name used in log lines.
    pub fn display_name(&self) -> &str {
        match self {
            Caller::Console => "Console",
            Caller::Player(player) => &player.name,
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A command contributed by a plugin.
///
/// The registry and dispatcher only ever see commands through this trait.
pub trait CommandDescriptor: Send + Sync {
    /// Canonical name. Must not be empty or contain `.`.
    fn name(&self) -> &str;

    /// Additional names the command answers to.
    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    /// Restriction on who may run the command.
    fn allowed_caller(&self) -> AllowedCaller {
        AllowedCaller::Any
    }

    /// Default help text.
    fn help(&self) -> &str {
        ""
    }

    /// Default syntax text.
    fn syntax(&self) -> &str {
        ""
    }

    /// Name of the code unit defining this command, used as the middle
    /// segment of registry identifiers.
    ///
    /// Defaults to the crate of the implementing type.
    fn source(&self) -> &str {
        let path = std::any::type_name::<Self>();
        path.split("::").next().unwrap_or(path)
    }

    /// Run the command.
    fn execute(&self, caller: &Caller, args: &[String]) -> Result<(), CommandError>;
}

/// Shared descriptor handle.
pub type DynCommand = Arc<dyn CommandDescriptor>;

type CommandFn = dyn Fn(&Caller, &[String]) -> Result<(), CommandError> + Send + Sync;

/// Closure-backed descriptor for commands that need no type of their own.
pub struct FnCommand {
    name: String,
    aliases: Vec<String>,
    allowed_caller: AllowedCaller,
    help: String,
    syntax: String,
    source: String,
    handler: Box<CommandFn>,
}

impl FnCommand {
    /// Create a new closure command.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Caller, &[String]) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            allowed_caller: AllowedCaller::Any,
            help: String::new(),
            syntax: String::new(),
            source: env!("CARGO_PKG_NAME").replace('-', "_"),
            handler: Box::new(handler),
        }
    }

    /// Builder pattern: set aliases
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Builder pattern: set allowed caller
    pub fn with_allowed_caller(mut self, allowed_caller: AllowedCaller) -> Self {
        self.allowed_caller = allowed_caller;
        self
    }

    /// Builder pattern: set help
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Builder pattern: set syntax
    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = syntax.into();
        self
    }

    /// Builder pattern: set source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Wrap into a shared handle.
    pub fn into_dyn(self) -> DynCommand {
        Arc::new(self)
    }
}

impl fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("allowed_caller", &self.allowed_caller)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl CommandDescriptor for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }

    fn allowed_caller(&self) -> AllowedCaller {
        self.allowed_caller
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn syntax(&self) -> &str {
        &self.syntax
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn execute(&self, caller: &Caller, args: &[String]) -> Result<(), CommandError> {
        (self.handler)(caller, args)
    }
}

/// Identity of a plugin or host that owns commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Provider {
    /// Namespace for command identifiers; stored as the owner reference.
    pub name: String,
    /// Provider type name; keys the persisted snapshot.
    pub kind: String,
}

impl Provider {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Something that contributes commands, usually a loaded plugin.
pub trait CommandProvider: Send + Sync {
    /// Identity under which the commands are registered.
    fn provider(&self) -> Provider;

    /// Commands contributed in this load cycle, in declaration order.
    fn commands(&self) -> Vec<DynCommand>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl CommandDescriptor for Ping {
        fn name(&self) -> &str {
            "ping"
        }

        fn execute(&self, _caller: &Caller, _args: &[String]) -> Result<(), CommandError> {
            Ok(())
        }
    }

    #[test]
    fn test_allowed_caller_permits() {
        let console = Caller::Console;
        let player = Caller::player("76561198000000000", "alice");

        assert!(AllowedCaller::Any.permits(&console));
        assert!(AllowedCaller::Any.permits(&player));
        assert!(!AllowedCaller::Player.permits(&console));
        assert!(AllowedCaller::Player.permits(&player));
        assert!(AllowedCaller::Console.permits(&console));
        assert!(!AllowedCaller::Console.permits(&player));
    }

    #[test]
    fn test_default_source_is_crate_name() {
        assert_eq!(Ping.source(), "cmdhub_core");
        assert!(Ping.aliases().is_empty());
        assert_eq!(Ping.allowed_caller(), AllowedCaller::Any);
    }

    #[test]
    fn test_fn_command_builder() {
        let cmd = FnCommand::new("kick", |_, args| {
            if args.is_empty() {
                Err(CommandError::usage("/kick <player>"))
            } else {
                Ok(())
            }
        })
        .with_aliases(["k"])
        .with_allowed_caller(AllowedCaller::Player)
        .with_syntax("<player>")
        .with_source("moderation");

        assert_eq!(cmd.name(), "kick");
        assert_eq!(cmd.aliases(), vec!["k".to_string()]);
        assert_eq!(cmd.allowed_caller(), AllowedCaller::Player);
        assert_eq!(cmd.syntax(), "<player>");
        assert_eq!(cmd.source(), "moderation");
        assert!(cmd.execute(&Caller::Console, &[]).is_err());
        assert!(cmd.execute(&Caller::Console, &["bob".to_string()]).is_ok());
    }

    #[test]
    fn test_caller_display() {
        assert_eq!(Caller::Console.to_string(), "Console");
        assert_eq!(Caller::player("1", "alice").to_string(), "alice");
    }
}
