//! Configuration for the guard and its file-backed store.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default byte quota of the file-backed store (5 MiB, the usual browser
/// local storage allowance).
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Usage percentage above which a health check triggers cleanup.
pub const DEFAULT_HEALTH_THRESHOLD_PERCENT: f64 = 80.0;

/// Environment variable overriding `log_level`.
pub const LOG_LEVEL_ENV: &str = "STORAGE_GUARD_LOG_LEVEL";

/// Guard configuration, stored as `config.json` under the base directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Capacity of the file-backed store in bytes.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
    /// Health check cleanup threshold, in percent of quota.
    #[serde(default = "default_health_threshold_percent")]
    pub health_threshold_percent: f64,
    /// Extra keys that the orphan sweep must leave alone.
    #[serde(default)]
    pub extra_known_keys: Vec<String>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_quota_bytes() -> u64 {
    DEFAULT_QUOTA_BYTES
}

fn default_health_threshold_percent() -> f64 {
    DEFAULT_HEALTH_THRESHOLD_PERCENT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            health_threshold_percent: DEFAULT_HEALTH_THRESHOLD_PERCENT,
            extra_known_keys: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `paths.config_file()`, falling back to
    /// defaults when the file does not exist, then apply env overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to `paths.config_file()`.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        debug!(path = %paths.config_file().display(), "config saved");
        Ok(())
    }

    /// Write a default `config.json` when none exists yet.
    ///
    /// Returns `true` when a file was written.
    pub fn write_default_if_missing(paths: &Paths) -> CoreResult<bool> {
        if paths.config_file().exists() {
            return Ok(false);
        }
        Self::default().save(paths)?;
        Ok(true)
    }

    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var(LOG_LEVEL_ENV) {
            if !log_level.trim().is_empty() {
                self.log_level = log_level.trim().to_string();
            }
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.quota_bytes == 0 {
            return Err(CoreError::Config("quota_bytes must be positive".to_string()));
        }
        if !(0.0..=100.0).contains(&self.health_threshold_percent) {
            return Err(CoreError::Config(format!(
                "health_threshold_percent must be within 0..=100, got {}",
                self.health_threshold_percent
            )));
        }
        if self.extra_known_keys.iter().any(|k| k.is_empty()) {
            return Err(CoreError::Config(
                "extra_known_keys must not contain empty keys".to_string(),
            ));
        }
        Ok(())
    }
}
