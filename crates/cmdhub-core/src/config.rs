//! Configuration defaults and environment overrides.
//!
//! Every setting has a compiled-in default in [`defaults`] and an optional
//! environment override named in [`env_vars`].

/// Default values
pub mod defaults {
    /// Leading character stripped from command lines.
    pub const COMMAND_PREFIX: char = '/';
    /// Directory holding persisted command snapshots.
    pub const SNAPSHOT_DIR: &str = "data/commands";
    /// Snapshot storage backend.
    pub const SNAPSHOT_BACKEND: &str = "json";
    /// Snapshot file name; `{}` is replaced by the provider kind.
    pub const SNAPSHOT_FILE_PATTERN: &str = "commands.{}.json";
    /// Default log filter.
    pub const LOG_FILTER: &str = "cmdhub_core=info,cmdhub_storage=info";
}

/// Environment variable names
pub mod env_vars {
    pub const COMMAND_PREFIX: &str = "CMDHUB_COMMAND_PREFIX";
    pub const SNAPSHOT_DIR: &str = "CMDHUB_SNAPSHOT_DIR";
    pub const SNAPSHOT_BACKEND: &str = "CMDHUB_SNAPSHOT_BACKEND";
    pub const LOG_JSON: &str = "CMDHUB_LOG_JSON";
}

/// Command prefix from the environment, or the default.
///
/// Only the first character of the variable is used.
pub fn command_prefix() -> char {
    std::env::var(env_vars::COMMAND_PREFIX)
        .ok()
        .and_then(|s| s.chars().next())
        .unwrap_or(defaults::COMMAND_PREFIX)
}

/// Snapshot directory from the environment, or the default.
pub fn snapshot_dir() -> std::path::PathBuf {
    std::env::var(env_vars::SNAPSHOT_DIR)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| defaults::SNAPSHOT_DIR.to_string())
        .into()
}

/// Snapshot backend name from the environment, or the default.
pub fn snapshot_backend() -> String {
    std::env::var(env_vars::SNAPSHOT_BACKEND)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| defaults::SNAPSHOT_BACKEND.to_string())
}

/// Whether JSON log output is requested.
pub fn log_json() -> bool {
    std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false)
}

/// File name of the snapshot for a provider kind.
pub fn snapshot_file_name(kind: &str) -> String {
    defaults::SNAPSHOT_FILE_PATTERN.replace("{}", kind)
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Leading character stripped from each line
    pub prefix: char,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            prefix: defaults::COMMAND_PREFIX,
        }
    }
}

impl DispatcherConfig {
    /// Build from environment overrides.
    pub fn from_env() -> Self {
        Self {
            prefix: command_prefix(),
        }
    }

    /// Builder pattern: set prefix
    pub fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(snapshot_file_name("PluginManager"), "commands.PluginManager.json");
    }

    #[test]
    fn test_dispatcher_config_default() {
        let config = DispatcherConfig::default();
        assert_eq!(config.prefix, '/');
        assert_eq!(config.with_prefix('!').prefix, '!');
    }
}
