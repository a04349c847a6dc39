//! Composition root and command handlers.

use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;

use guard_config_and_utils::Config;
use guard_storage::{FileStore, HealthSnapshot, KeyRegistry, RecoveryPrompt, StorageGuard};
use serde::Serialize;
use tracing::info;

use crate::prompt::TerminalPrompt;
use crate::Commands;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Open the file store and wire it into a guard configured from `config`.
pub fn open_guard(config: &Config, store_path: PathBuf) -> CliResult<StorageGuard> {
    let store = FileStore::open(&store_path, config.quota_bytes)?;
    info!(store = %store_path.display(), quota_bytes = config.quota_bytes, "store opened");

    let registry = KeyRegistry::default().with_extra_keys(config.extra_known_keys.iter().cloned());
    Ok(StorageGuard::new(Box::new(store), registry)
        .with_prompt(Box::new(TerminalPrompt))
        .with_health_threshold(config.health_threshold_percent))
}

pub fn run(
    guard: &StorageGuard,
    command: Commands,
    initial_health: Option<HealthSnapshot>,
) -> CliResult<()> {
    match command {
        Commands::Get { key } => match guard.get(&key) {
            Some(value) => println!("{}", value),
            None => return Err(format!("no value for '{}'", key).into()),
        },
        Commands::Set { key, value, stdin } => {
            let value = match (value, stdin) {
                (_, true) => read_stdin()?,
                (Some(value), false) => value,
                (None, false) => return Err("missing value".into()),
            };
            if !guard.set(&key, &value) {
                return Err(format!("failed to store '{}'", key).into());
            }
        }
        Commands::Rm { key } => {
            if !guard.remove(&key) {
                return Err(format!("failed to remove '{}'", key).into());
            }
        }
        Commands::Keys => {
            for line in key_lines(guard) {
                println!("{}", line);
            }
        }
        Commands::Cleanup => print_json(&guard.cleanup())?,
        Commands::Health => match initial_health {
            Some(snapshot) => print_json(&snapshot)?,
            None => return Err("store did not report usage".into()),
        },
        Commands::Report => print_json(&guard.storage_report())?,
        Commands::Recover { yes } => {
            let confirmed = yes
                || TerminalPrompt.confirm_emergency_clear(
                    "Clear every entry except the login token, user profile and theme?",
                );
            if !confirmed {
                return Ok(());
            }
            let outcome = guard.emergency_recover();
            print_json(&outcome)?;
            if !outcome.is_success() {
                return Err("emergency clear did not complete".into());
            }
        }
    }
    Ok(())
}

fn read_stdin() -> CliResult<String> {
    let mut value = String::new();
    io::stdin().read_to_string(&mut value)?;
    Ok(value.strip_suffix('\n').unwrap_or(&value).to_string())
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One `<class>\t<key>` line per stored key.
fn key_lines(guard: &StorageGuard) -> Vec<String> {
    let registry = guard.registry();
    guard
        .keys()
        .into_iter()
        .map(|key| {
            let class = if registry.is_protected(&key) {
                "protected"
            } else if registry.is_known(&key) {
                "registered"
            } else {
                "unknown"
            };
            format!("{}\t{}", class, key)
        })
        .collect()
}
