//! Quota-aware storage guard.
//!
//! [`StorageGuard`] wraps a capacity-limited [`HostStore`] and keeps it
//! usable when it fills up:
//! - writes that fail with a quota error trigger one cleanup and one retry
//! - a write that still fails escalates to an emergency clear that keeps
//!   only the protected keys (`token`, `user`, `theme`)
//! - reads and deletes never surface host errors
//!
//! Host store implementations:
//! - [`MemoryStore`]: in-process map with an optional byte quota
//! - [`FileStore`]: JSON file persisted with atomic replace, byte quota

mod classify;
mod clock;
mod file;
mod guard;
mod keys;
mod memory;
mod prompt;
mod report;
mod traits;

#[cfg(test)]
mod tests;

pub use classify::{classify, HostError, WriteFailure};
pub use clock::{date_stamp, Clock, FixedClock, SystemClock, DATE_STAMP_FORMAT};
pub use file::FileStore;
pub use guard::{GuardStats, RecoveryOutcome, StorageGuard};
pub use keys::{KeyRegistry, StorageKeys};
pub use memory::MemoryStore;
pub use prompt::{HeadlessPrompt, RecoveryPrompt};
pub use report::{entry_size, format_bytes, CleanupReport, HealthSnapshot, StorageReport};
pub use traits::{HostResult, HostStore, StorageEstimate};

use thiserror::Error;

/// Errors from opening or loading a host store.
///
/// Guard operations never return these; they are only produced while
/// constructing a store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for store construction.
pub type StorageResult<T> = Result<T, StorageError>;
