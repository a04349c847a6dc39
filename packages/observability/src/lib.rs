//! # Observability
//!
//! Logging setup for the storage-guard workspace.
//!
//! Crates never configure subscribers themselves. The binary calls
//! [`init_with_config`] once at startup and everything else uses plain
//! `tracing` macros with structured fields:
//!
//! ```rust,ignore
//! tracing::warn!(key = %key, "quota exceeded, running cleanup");
//! ```
//!
//! ## Dev Mode
//!
//! With the default `dev` feature every event is appended as one JSON object
//! per line to `~/.storage-guard/logs/guard.jsonl` (or the configured path):
//!
//! - `tail -f ~/.storage-guard/logs/guard.jsonl | jq`
//!
//! Without the feature a compact formatter writes to stderr only.

#[cfg(feature = "dev")]
mod dev;

#[cfg(feature = "dev")]
mod json_layer;

use std::path::PathBuf;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written into every JSON line.
    pub service_name: String,

    /// Default filter (e.g. "debug", "info").
    /// `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// Log file path. Defaults to `~/.storage-guard/logs/guard.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging with custom configuration.
pub fn init_with_config(config: LogConfig) {
    #[cfg(feature = "dev")]
    {
        dev::init_dev_subscriber(&config);
    }

    #[cfg(not(feature = "dev"))]
    {
        use tracing_subscriber::util::SubscriberInitExt;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level)),
            )
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .init();
    }
}
