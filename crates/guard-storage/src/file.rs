//! JSON-file host store.

use crate::memory::{check_quota, usage};
use crate::{HostError, HostResult, HostStore, StorageEstimate, StorageResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// Store persisted as one JSON object, rewritten atomically on every change.
///
/// The in-memory map is only updated after the file write succeeds, so a
/// failed write leaves both the file and the map unchanged.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: u64,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, loading existing entries. A missing or empty file is an
    /// empty store.
    pub fn open(path: impl Into<PathBuf>, quota_bytes: u64) -> StorageResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let used = usage(&entries);
        if used > quota_bytes {
            warn!(
                path = %path.display(),
                used, quota_bytes, "store already exceeds its quota"
            );
        }
        debug!(path = %path.display(), entries = entries.len(), "opened file store");

        Ok(Self {
            path,
            quota_bytes,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> HostResult<()> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| HostError::new(e.to_string()).with_name("EncodingError"))?;
        atomic_write_text(&self.path, &content).map_err(host_error_from_io)
    }

    /// Apply `change` to a copy of the entries, persist, then commit.
    fn commit<F>(&self, change: F) -> HostResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> HostResult<()>,
    {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        change(&mut next)?;
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

fn host_error_from_io(err: io::Error) -> HostError {
    if err.kind() == io::ErrorKind::StorageFull {
        HostError::quota_exceeded(err.to_string())
    } else {
        HostError::new(err.to_string()).with_name(format!("{:?}", err.kind()))
    }
}

fn atomic_write_text(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "store path has no file name"))?;

    fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!(
        ".{}.tmp.{}",
        file_name,
        std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));

    let result = (|| -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

#[async_trait]
impl HostStore for FileStore {
    fn get(&self, key: &str) -> HostResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> HostResult<()> {
        self.commit(|entries| {
            check_quota(entries, key, value, self.quota_bytes)?;
            entries.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> HostResult<()> {
        if !self.entries.lock().contains_key(key) {
            return Ok(());
        }
        self.commit(|entries| {
            entries.remove(key);
            Ok(())
        })
    }

    fn keys(&self) -> HostResult<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }

    fn clear(&self) -> HostResult<()> {
        self.commit(|entries| {
            entries.clear();
            Ok(())
        })
    }

    async fn estimate(&self) -> HostResult<Option<StorageEstimate>> {
        Ok(Some(StorageEstimate {
            usage_bytes: usage(&self.entries.lock()),
            quota_bytes: self.quota_bytes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify, WriteFailure};
    use tempfile::tempdir;

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path, 1024).unwrap();
        store.set("token", "abc").unwrap();
        store.set("theme", "dark").unwrap();
        store.remove("theme").unwrap();
        drop(store);

        let reopened = FileStore::open(&path, 1024).unwrap();
        assert_eq!(reopened.get("token").unwrap(), Some("abc".to_string()));
        assert_eq!(reopened.get("theme").unwrap(), None);
    }

    #[test]
    fn test_missing_and_empty_file_open_empty() {
        let dir = tempdir().unwrap();
        let missing = FileStore::open(dir.path().join("nope.json"), 10).unwrap();
        assert!(missing.keys().unwrap().is_empty());

        let empty_path = dir.path().join("empty.json");
        fs::write(&empty_path, "  \n").unwrap();
        let empty = FileStore::open(&empty_path, 10).unwrap();
        assert!(empty.keys().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_encoding_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(
            FileStore::open(&path, 10),
            Err(crate::StorageError::Encoding(_))
        ));
    }

    #[test]
    fn test_quota_rejection_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path, 12).unwrap();
        store.set("token", "abc").unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let err = store.set("user", "a much longer profile").unwrap_err();
        assert_eq!(classify(&err), WriteFailure::QuotaExceeded);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(store.get("user").unwrap(), None);
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path, 1024).unwrap();
        store.set("a", "1").unwrap();
        store.clear().unwrap();

        let reopened = FileStore::open(&path, 1024).unwrap();
        assert!(reopened.keys().unwrap().is_empty());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path, 1024).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["store.json".to_string()]);
    }

    #[test]
    fn test_io_error_mapping() {
        let full = host_error_from_io(io::Error::from(io::ErrorKind::StorageFull));
        assert_eq!(classify(&full), WriteFailure::QuotaExceeded);

        let denied = host_error_from_io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(classify(&denied), WriteFailure::Other);
        assert_eq!(denied.name.as_deref(), Some("PermissionDenied"));
    }

    #[tokio::test]
    async fn test_estimate_reports_usage() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json"), 100).unwrap();
        store.set("theme", "dark").unwrap();

        let estimate = store.estimate().await.unwrap().unwrap();
        assert_eq!(estimate.usage_bytes, 9);
        assert_eq!(estimate.quota_bytes, 100);
    }
}
