//! File system layout under the base directory.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

const BASE_DIR_NAME: &str = ".storage-guard";

/// Resolves every file the guard touches.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Use `~/.storage-guard` as the base directory.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Use a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// `<base>/config.json`
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// `<base>/store.json`, the file-backed host store.
    pub fn store_file(&self) -> PathBuf {
        self.base_dir.join("store.json")
    }

    /// `<base>/logs`
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// `<base>/logs/guard.jsonl`
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("guard.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
