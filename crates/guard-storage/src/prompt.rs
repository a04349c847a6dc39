//! User interaction during quota recovery.

use tracing::{info, warn};

/// Shown when a write still fails after cleanup.
pub(crate) const STORAGE_FULL_MESSAGE: &str = "Local storage is full and automatic cleanup \
could not free enough space.\n\nClear the local cache now? Your login and theme will be kept; \
everything else is re-fetched from the server.";

/// Shown after a successful emergency clear.
pub(crate) const RECOVERED_MESSAGE: &str = "Local cache cleared. Please reload the application.";

/// Shown when the emergency clear or the restore of protected keys failed.
pub(crate) const RECOVERY_FAILED_MESSAGE: &str = "Clearing local storage failed. Your login \
session may be lost: clear this application's storage manually, then reload.";

/// Blocking interaction with the user while the store is full.
pub trait RecoveryPrompt: Send + Sync {
    /// Ask whether to run the emergency clear. Blocks until answered.
    fn confirm_emergency_clear(&self, message: &str) -> bool;

    /// Final status after the emergency clear.
    fn notify(&self, message: &str);

    /// In-memory application state may be stale; reload it.
    fn request_reload(&self);
}

/// Prompt for environments with no user attached: logs and declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPrompt;

impl RecoveryPrompt for HeadlessPrompt {
    fn confirm_emergency_clear(&self, message: &str) -> bool {
        warn!(%message, "no interactive prompt, emergency clear declined");
        false
    }

    fn notify(&self, message: &str) {
        warn!(%message, "storage notice");
    }

    fn request_reload(&self) {
        info!("reload requested");
    }
}
