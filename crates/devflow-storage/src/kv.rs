//! Key-value backends
//!
//! A record is a whole string value under a key; every write replaces the
//! entire value. There are no transactions across keys.

use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Whole-record key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a record; `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a record
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete a record; deleting an absent record succeeds
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    records: HashMap<String, String>,
    quota_bytes: Option<usize>,
    offline: bool,
    writes: usize,
}

impl MemoryInner {
    fn size_with(&self, key: &str, value: &str) -> usize {
        self.records
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline {
            Err(StorageError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Process-local store, the stand-in for browser local storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Create empty store without quota
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store that rejects writes growing it past `bytes` (keys plus values)
    #[inline]
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::default();
        store.inner.lock().quota_bytes = Some(bytes);
        store
    }

    /// Simulate the backing storage going away (or coming back)
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// Number of successful writes (sets and removes) so far
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    /// Raw record, bypassing availability checks
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.lock().records.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.inner.lock();
        guard.check_online()?;
        Ok(guard.records.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self.inner.lock();
        guard.check_online()?;
        if let Some(limit) = guard.quota_bytes {
            let needed = guard.size_with(key, &value);
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        guard.records.insert(key.to_string(), value);
        guard.writes += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.inner.lock();
        guard.check_online()?;
        guard.records.remove(key);
        guard.writes += 1;
        Ok(())
    }
}

/// Directory-backed store: one JSON file per record
///
/// Writes go to a temp file in the same directory and are renamed over the
/// record, so readers see either the old or the new value, never a prefix.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(dir.display().to_string(), e))?;
        Ok(Self { dir })
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StorageError::io(key, e))?;
        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StorageError::io(key, e))?;
        tmp.persist(self.path_for(key))
            .map_err(|e| StorageError::io(key, e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }
}
