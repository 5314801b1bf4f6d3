//! Error types shared across the command system.

use thiserror::Error;

/// Failure raised by a command body.
///
/// `PermissionDenied` and `Usage` are the known, user-facing failure kinds.
/// Anything else is wrapped in `Failed` and treated as a fault.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The caller lacks the permission the command requires.
    #[error("{0}")]
    PermissionDenied(String),

    /// The command was invoked with malformed arguments.
    #[error("{0}")]
    Usage(String),

    /// Any other failure.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl CommandError {
    /// Build a permission failure.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        CommandError::PermissionDenied(message.into())
    }

    /// Build a usage failure.
    pub fn usage(message: impl Into<String>) -> Self {
        CommandError::Usage(message.into())
    }

    /// Whether this is an anticipated, user-facing failure.
    pub fn is_known(&self) -> bool {
        !matches!(self, CommandError::Failed(_))
    }
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The descriptor violates its own invariants (e.g. an empty name).
    #[error("Invalid command descriptor: {0}")]
    InvalidDescriptor(String),
}
