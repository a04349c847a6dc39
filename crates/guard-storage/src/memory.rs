//! In-process host store.

use crate::{entry_size, HostError, HostResult, HostStore, StorageEstimate};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// `BTreeMap`-backed store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    /// Unbounded store. Does not report estimates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn usage_bytes(&self) -> u64 {
        usage(&self.entries.lock())
    }
}

pub(crate) fn usage(entries: &BTreeMap<String, String>) -> u64 {
    entries.iter().map(|(k, v)| entry_size(k, v)).sum()
}

/// Usage after replacing `key` with `value`.
pub(crate) fn projected_usage(entries: &BTreeMap<String, String>, key: &str, value: &str) -> u64 {
    let current = usage(entries);
    let replaced = entries.get(key).map(|old| entry_size(key, old)).unwrap_or(0);
    current - replaced + entry_size(key, value)
}

pub(crate) fn check_quota(
    entries: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota_bytes: u64,
) -> HostResult<()> {
    let projected = projected_usage(entries, key, value);
    if projected > quota_bytes {
        return Err(HostError::quota_exceeded(format!(
            "writing '{}' needs {} bytes, quota is {} bytes",
            key, projected, quota_bytes
        )));
    }
    Ok(())
}

#[async_trait]
impl HostStore for MemoryStore {
    fn get(&self, key: &str) -> HostResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> HostResult<()> {
        let mut entries = self.entries.lock();
        if let Some(quota) = self.quota_bytes {
            check_quota(&entries, key, value, quota)?;
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> HostResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> HostResult<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }

    fn clear(&self) -> HostResult<()> {
        self.entries.lock().clear();
        Ok(())
    }

    async fn estimate(&self) -> HostResult<Option<StorageEstimate>> {
        Ok(self.quota_bytes.map(|quota_bytes| StorageEstimate {
            usage_bytes: self.usage_bytes(),
            quota_bytes,
        }))
    }
}
