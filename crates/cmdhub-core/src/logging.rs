//! Tracing subscriber bootstrap for hosts embedding the command system.

use tracing_subscriber::EnvFilter;

use crate::config;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `cmdhub_core=info,cmdhub_storage=info` plus warnings from
/// everything else. `CMDHUB_LOG_JSON=true` switches to JSON lines.
/// Fails, without panicking, if a subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config::defaults::LOG_FILTER).add_directive(tracing::Level::WARN.into())
    });

    let result = if config::log_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .compact()
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}
