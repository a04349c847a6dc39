//! The storage guard.

use crate::prompt::{RECOVERED_MESSAGE, RECOVERY_FAILED_MESSAGE, STORAGE_FULL_MESSAGE};
use crate::report::{CleanupReport, HealthSnapshot, StorageReport};
use crate::{
    classify, date_stamp, entry_size, format_bytes, Clock, HeadlessPrompt, HostStore,
    KeyRegistry, RecoveryPrompt, SystemClock, WriteFailure,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, warn};

/// Usage percentage above which `check_health` runs cleanup.
const DEFAULT_HEALTH_THRESHOLD_PERCENT: f64 = 80.0;

/// Result of an emergency clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    /// Store cleared, every held protected key written back.
    Recovered { restored: Vec<String> },
    /// The clear itself failed; the store is unchanged.
    ClearFailed { reason: String },
    /// Store cleared but some protected keys could not be written back.
    /// Session state is lost for `lost`.
    RestoreFailed {
        restored: Vec<String>,
        lost: Vec<String>,
    },
}

impl RecoveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    fn user_message(&self) -> &'static str {
        if self.is_success() {
            RECOVERED_MESSAGE
        } else {
            RECOVERY_FAILED_MESSAGE
        }
    }
}

/// Counters over the life of one guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GuardStats {
    pub cleanups: u64,
    pub write_retries: u64,
    pub quota_failures: u64,
    pub emergency_recoveries: u64,
}

#[derive(Debug, Default)]
struct Counters {
    cleanups: AtomicU64,
    write_retries: AtomicU64,
    quota_failures: AtomicU64,
    emergency_recoveries: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> GuardStats {
        GuardStats {
            cleanups: self.cleanups.load(Ordering::Relaxed),
            write_retries: self.write_retries.load(Ordering::Relaxed),
            quota_failures: self.quota_failures.load(Ordering::Relaxed),
            emergency_recoveries: self.emergency_recoveries.load(Ordering::Relaxed),
        }
    }
}

/// Quota-aware read/write/delete over a [`HostStore`].
///
/// None of the public operations return errors or panic on host failures:
/// reads degrade to `None`, writes and deletes to `false`. Construct one per
/// application and pass it to whatever needs persistence.
pub struct StorageGuard {
    store: Box<dyn HostStore>,
    registry: KeyRegistry,
    clock: Box<dyn Clock>,
    prompt: Box<dyn RecoveryPrompt>,
    health_threshold_percent: f64,
    counters: Counters,
}

impl StorageGuard {
    /// Guard with the system clock, a headless prompt and the default
    /// health threshold.
    pub fn new(store: Box<dyn HostStore>, registry: KeyRegistry) -> Self {
        Self {
            store,
            registry,
            clock: Box::new(SystemClock),
            prompt: Box::new(HeadlessPrompt),
            health_threshold_percent: DEFAULT_HEALTH_THRESHOLD_PERCENT,
            counters: Counters::default(),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_prompt(mut self, prompt: Box<dyn RecoveryPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_health_threshold(mut self, percent: f64) -> Self {
        self.health_threshold_percent = percent;
        self
    }

    /// Run the first health check.
    pub async fn init(&self) -> Option<HealthSnapshot> {
        debug!(threshold = self.health_threshold_percent, "storage guard starting");
        self.check_health().await
    }

    /// Shut the guard down and hand the host store back.
    pub fn dispose(self) -> Box<dyn HostStore> {
        let stats = self.stats();
        info!(
            cleanups = stats.cleanups,
            write_retries = stats.write_retries,
            quota_failures = stats.quota_failures,
            emergency_recoveries = stats.emergency_recoveries,
            "storage guard disposed"
        );
        self.store
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn stats(&self) -> GuardStats {
        self.counters.snapshot()
    }

    // ==========================================
    // Read / write / delete
    // ==========================================

    /// Write `value` under `key`.
    ///
    /// A quota failure gets one cleanup and one retry; if the retry also
    /// fails the user is offered an emergency clear. Any other failure
    /// returns `false` straight away.
    pub fn set(&self, key: &str, value: &str) -> bool {
        if key.is_empty() {
            warn!("refusing to write an empty key");
            return false;
        }

        let err = match self.store.set(key, value) {
            Ok(()) => return true,
            Err(err) => err,
        };

        if classify(&err) == WriteFailure::Other {
            error!(key = %key, error = %err, "storage write failed");
            return false;
        }

        warn!(key = %key, error = %err, "storage quota exceeded, attempting cleanup");
        self.cleanup();

        Counters::bump(&self.counters.write_retries);
        match self.store.set(key, value) {
            Ok(()) => {
                info!(key = %key, "write succeeded after cleanup");
                true
            }
            Err(retry_err) => {
                error!(key = %key, error = %retry_err, "write still failing after cleanup");
                self.handle_quota_failure();
                false
            }
        }
    }

    /// Read `key`. Host errors read as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                error!(key = %key, error = %err, "storage read failed");
                None
            }
        }
    }

    /// Delete `key`. Host errors report `false`.
    pub fn remove(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(err) => {
                error!(key = %key, error = %err, "storage remove failed");
                false
            }
        }
    }

    /// Every key in the host store; empty when enumeration fails.
    pub fn keys(&self) -> Vec<String> {
        self.store.keys().unwrap_or_else(|err| {
            error!(error = %err, "storage key enumeration failed");
            Vec::new()
        })
    }

    // ==========================================
    // Cleanup
    // ==========================================

    /// Drop non-essential entries, in order:
    /// 1. dated caches whose stamp is set and not today
    /// 2. scratch entries
    /// 3. keys that are neither registered nor protected
    pub fn cleanup(&self) -> CleanupReport {
        Counters::bump(&self.counters.cleanups);
        info!("storage cleanup started");
        let mut report = CleanupReport::default();

        let today = date_stamp(self.clock.today());
        for cache in self.registry.dated_caches() {
            match self.get(&cache.date_key) {
                Some(stamp) if !stamp.is_empty() && stamp != today => {
                    info!(key = %cache.data_key, stamp = %stamp, "removing stale dated cache");
                    self.remove_tracked(&cache.data_key, &mut report);
                    self.remove_tracked(&cache.date_key, &mut report);
                }
                _ => {}
            }
        }

        for key in self.registry.scratch_keys() {
            if self.get(key).is_some() {
                debug!(key = %key, "removing scratch entry");
                self.remove_tracked(key, &mut report);
            }
        }

        for key in self.keys() {
            if !self.registry.is_known(&key) && !self.registry.is_protected(&key) {
                info!(key = %key, "removing unknown key");
                self.remove_tracked(&key, &mut report);
            }
        }

        info!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            "storage cleanup complete"
        );
        report
    }

    fn remove_tracked(&self, key: &str, report: &mut CleanupReport) {
        if self.remove(key) {
            report.removed.push(key.to_string());
        } else {
            report.failed.push(key.to_string());
        }
    }

    // ==========================================
    // Health
    // ==========================================

    /// Ask the host for a usage estimate; run cleanup when usage is above
    /// the threshold. `None` when the host has no estimate to give.
    pub async fn check_health(&self) -> Option<HealthSnapshot> {
        let estimate = match self.store.estimate().await {
            Ok(Some(estimate)) => estimate,
            Ok(None) => {
                debug!("host store does not report usage");
                return None;
            }
            Err(err) => {
                error!(error = %err, "storage estimate failed");
                return None;
            }
        };

        let snapshot = HealthSnapshot::from_estimate(estimate)?;
        info!(
            usage = %format_bytes(snapshot.usage_bytes),
            quota = %format_bytes(snapshot.quota_bytes),
            percent_used = snapshot.percent_used,
            "storage usage"
        );

        if snapshot.percent_used > self.health_threshold_percent {
            warn!(
                percent_used = snapshot.percent_used,
                threshold = self.health_threshold_percent,
                "storage usage above threshold"
            );
            self.cleanup();
        }

        Some(snapshot)
    }

    /// Bytes held by all readable entries.
    pub fn local_storage_size(&self) -> u64 {
        self.entry_sizes().values().sum()
    }

    /// Per-key and total usage.
    pub fn storage_report(&self) -> StorageReport {
        StorageReport::from_sizes(self.entry_sizes())
    }

    fn entry_sizes(&self) -> BTreeMap<String, u64> {
        self.keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.get(&key)?;
                let size = entry_size(&key, &value);
                Some((key, size))
            })
            .collect()
    }

    // ==========================================
    // Emergency recovery
    // ==========================================

    fn handle_quota_failure(&self) {
        Counters::bump(&self.counters.quota_failures);
        error!("storage quota exceeded and cleanup did not free enough space");

        if !self.prompt.confirm_emergency_clear(STORAGE_FULL_MESSAGE) {
            info!("emergency clear declined");
            return;
        }

        let outcome = self.emergency_recover();
        self.prompt.notify(outcome.user_message());
        if outcome.is_success() {
            self.prompt.request_reload();
        }
    }

    /// Clear the host store, keeping only protected keys.
    ///
    /// Restores go straight to the host store, not through [`Self::set`].
    pub fn emergency_recover(&self) -> RecoveryOutcome {
        Counters::bump(&self.counters.emergency_recoveries);

        let held: Vec<(String, String)> = self
            .registry
            .protected_keys()
            .filter_map(|key| {
                self.get(key)
                    .filter(|value| !value.is_empty())
                    .map(|value| (key.to_string(), value))
            })
            .collect();

        if let Err(err) = self.store.clear() {
            error!(error = %err, "emergency clear failed");
            return RecoveryOutcome::ClearFailed {
                reason: err.to_string(),
            };
        }

        let mut restored = Vec::new();
        let mut lost = Vec::new();
        for (key, value) in held {
            match self.store.set(&key, &value) {
                Ok(()) => restored.push(key),
                Err(err) => {
                    error!(key = %key, error = %err, "failed to restore protected key");
                    lost.push(key);
                }
            }
        }

        if lost.is_empty() {
            info!(restored = restored.len(), "emergency clear complete");
            RecoveryOutcome::Recovered { restored }
        } else {
            error!(
                lost = ?lost,
                "emergency clear lost protected keys, session state is gone"
            );
            RecoveryOutcome::RestoreFailed { restored, lost }
        }
    }
}
