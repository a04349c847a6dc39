//! Logging initialization.
//!
//! Thin wrapper over the `observability` package so the binary only needs
//! a level and the resolved [`Paths`].

use crate::Paths;
use observability::LogConfig;

/// Service name written into every log line.
pub const SERVICE_NAME: &str = "storage-guard";

/// Install the global subscriber.
///
/// JSONL goes to `paths.log_file()`; when `also_stderr` is set, a compact
/// copy goes to stderr as well. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str, paths: &Paths, also_stderr: bool) {
    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}
