//! Sizes, usage snapshots and cleanup results.

use crate::StorageEstimate;
use serde::Serialize;
use std::collections::BTreeMap;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size: base 1024, at most two decimals, units up to GB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut exponent = 0;
    let mut threshold = 1024u64;
    while exponent < UNITS.len() - 1 && bytes >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1024);
    }
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}

/// Bytes an entry occupies: key plus value, UTF-8.
pub fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// Point-in-time usage of the host store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub usage_bytes: u64,
    pub quota_bytes: u64,
    /// Rounded to two decimals.
    pub percent_used: f64,
}

impl HealthSnapshot {
    /// `None` for a zero quota, which carries no usable percentage.
    pub fn from_estimate(estimate: StorageEstimate) -> Option<Self> {
        if estimate.quota_bytes == 0 {
            return None;
        }
        let percent = estimate.usage_bytes as f64 / estimate.quota_bytes as f64 * 100.0;
        Some(Self {
            usage_bytes: estimate.usage_bytes,
            quota_bytes: estimate.quota_bytes,
            percent_used: (percent * 100.0).round() / 100.0,
        })
    }
}

/// Keys touched by one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

/// Per-key and total usage, as returned by `StorageGuard::storage_report`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageReport {
    pub items: BTreeMap<String, String>,
    pub total: String,
    pub total_bytes: u64,
}

impl StorageReport {
    pub(crate) fn from_sizes(sizes: BTreeMap<String, u64>) -> Self {
        let total_bytes = sizes.values().sum();
        Self {
            items: sizes
                .into_iter()
                .map(|(key, size)| (key, format_bytes(size)))
                .collect(),
            total: format_bytes(total_bytes),
            total_bytes,
        }
    }
}
