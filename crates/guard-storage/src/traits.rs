//! Host store trait.

use crate::HostError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a host store call.
pub type HostResult<T> = Result<T, HostError>;

/// Usage estimate reported by a host store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEstimate {
    pub usage_bytes: u64,
    pub quota_bytes: u64,
}

/// Capacity-limited string-to-string store wrapped by the guard.
///
/// All calls are synchronous except [`HostStore::estimate`], which is an
/// optional capability.
#[async_trait]
pub trait HostStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> HostResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> HostResult<()>;

    /// Delete a value. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> HostResult<()>;

    /// Every key physically present.
    fn keys(&self) -> HostResult<Vec<String>>;

    /// Drop every entry.
    fn clear(&self) -> HostResult<()>;

    /// Usage/quota estimate. `Ok(None)` when the host cannot report one.
    async fn estimate(&self) -> HostResult<Option<StorageEstimate>> {
        Ok(None)
    }
}
