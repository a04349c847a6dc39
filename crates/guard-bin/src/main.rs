//! storage-guard - inspect and maintain a quota-limited key-value store.

mod app;
mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use guard_config_and_utils::{init_logging, Config, Paths};

/// storage-guard command-line interface.
#[derive(Parser)]
#[command(name = "storage-guard")]
#[command(about = "Quota-aware guard over a persistent key-value store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to the config value
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for config, store and logs. Defaults to ~/.storage-guard
    #[arg(long, global = true, env = "STORAGE_GUARD_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Store file to operate on instead of <base-dir>/store.json
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value, cleaning up if the store is full
    Set {
        key: String,
        /// Value to store; read from stdin when --stdin is given
        #[arg(required_unless_present = "stdin")]
        value: Option<String>,
        #[arg(long)]
        stdin: bool,
    },
    /// Remove a key
    Rm { key: String },
    /// List keys with their classification
    Keys,
    /// Drop stale caches, scratch entries and unknown keys
    Cleanup,
    /// Report usage against the quota (cleans up above the threshold)
    Health,
    /// Per-key size report
    Report,
    /// Clear everything except protected keys
    Recover {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    Config::write_default_if_missing(&paths)?;
    let config = Config::load(&paths)?;

    let level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, &paths, cli.verbose);

    let store_path = cli.store.unwrap_or_else(|| paths.store_file());
    let guard = app::open_guard(&config, store_path)?;
    let initial_health = guard.init().await;

    let result = app::run(&guard, cli.command, initial_health);
    guard.dispose();
    result
}
