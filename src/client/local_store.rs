//! Synchronous string key/value storage with a byte quota.
//!
//! Models browser local storage: small, synchronous, string-only, and
//! bounded. A write that would push the total size (keys plus values)
//! past the quota fails with [`StorageError::QuotaExceeded`] and leaves the
//! store unchanged.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::error::StorageError;

/// Default quota, the common browser allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// String key/value store.
pub trait LocalStore: fmt::Debug + Send + Sync {
    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] if the store would grow past
    /// its quota; the previous value is kept.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store.
#[derive(Debug)]
pub struct MemoryLocalStore {
    items: RwLock<HashMap<String, String>>,
    quota: usize,
}

impl MemoryLocalStore {
    /// Creates an empty store with the default quota.
    #[must_use]
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// Creates an empty store holding at most `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota,
        }
    }

    /// Bytes currently used.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the lock is poisoned.
    pub fn used_bytes(&self) -> Result<usize, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned)?;
        Ok(items.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

impl Default for MemoryLocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        let others: usize = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        let needed = others + key.len() + value.len();
        if needed > self.quota {
            return Err(StorageError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// Store keeping one file per key under a directory.
///
/// Keys are restricted to ASCII letters, digits, `-`, `_` and `.` so they
/// map directly onto file names.
///
/// Calls do blocking file I/O on the calling thread. The store is sized
/// for a handful of small keys (a token, a cached list) where that cost is
/// a single small read or write; it is not meant for bulk data. The
/// directory is scanned once on open; after that the quota is checked
/// against an in-memory size index, so the directory must not be shared
/// with other writers.
#[derive(Debug)]
pub struct FileLocalStore {
    dir: PathBuf,
    quota: usize,
    /// Bytes held per key (key plus value). Also serializes the size
    /// check with the write that follows it.
    sizes: RwLock<HashMap<String, usize>>,
}

impl FileLocalStore {
    /// Opens (creating if needed) a store rooted at `dir` with the default
    /// quota.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_quota(dir, DEFAULT_QUOTA_BYTES)
    }

    /// Opens a store rooted at `dir` holding at most `quota` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open_with_quota(dir: impl AsRef<Path>, quota: usize) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let sizes = scan_sizes(&dir)?;
        Ok(Self {
            dir,
            quota,
            sizes: RwLock::new(sizes),
        })
    }

    /// Total bytes currently held.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if a writer panicked.
    pub fn used_bytes(&self) -> Result<usize, StorageError> {
        let sizes = self.sizes.read().map_err(|_| StorageError::Poisoned)?;
        Ok(sizes.values().sum())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(self.dir.join(key))
        } else {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

}

fn scan_sizes(dir: &Path) -> Result<HashMap<String, usize>, StorageError> {
    let mut sizes = HashMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(".tmp") || !entry.file_type()?.is_file() {
            continue;
        }
        let len = usize::try_from(entry.metadata()?.len()).unwrap_or(usize::MAX);
        let size = name.len().saturating_add(len);
        sizes.insert(name, size);
    }
    Ok(sizes)
}

impl LocalStore for FileLocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        let _sizes = self.sizes.read().map_err(|_| StorageError::Poisoned)?;
        match std::fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let mut sizes = self.sizes.write().map_err(|_| StorageError::Poisoned)?;
        let entry = key.len() + value.len();
        let others: usize = sizes
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, n)| n)
            .sum();
        let needed = others + entry;
        if needed > self.quota {
            return Err(StorageError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }
        let tmp = self.dir.join(format!("{key}.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        sizes.insert(key.to_string(), entry);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let mut sizes = self.sizes.write().map_err(|_| StorageError::Poisoned)?;
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        sizes.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryLocalStore::new();
        assert_eq!(store.get_item("authToken"), Ok(None));
        assert!(store.set_item("authToken", "cx_1").is_ok());
        assert_eq!(store.get_item("authToken"), Ok(Some("cx_1".to_string())));
        assert!(store.remove_item("authToken").is_ok());
        assert!(store.remove_item("authToken").is_ok());
        assert_eq!(store.get_item("authToken"), Ok(None));
    }

    #[test]
    fn memory_quota_counts_keys_and_values() {
        let store = MemoryLocalStore::with_quota(10);
        assert!(store.set_item("k", "123456789").is_ok());
        assert_eq!(store.used_bytes(), Ok(10));
        assert!(matches!(
            store.set_item("x", "1"),
            Err(StorageError::QuotaExceeded { needed: 12, quota: 10 })
        ));
        // Replacing a value only counts the new size.
        assert!(store.set_item("k", "12345678").is_ok());
        assert_eq!(store.get_item("k"), Ok(Some("12345678".to_string())));
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let store = MemoryLocalStore::with_quota(8);
        assert!(store.set_item("k", "old").is_ok());
        assert!(store.set_item("k", "far too long").is_err());
        assert_eq!(store.get_item("k"), Ok(Some("old".to_string())));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(store) = FileLocalStore::open(dir.path()) else {
            panic!("open");
        };
        assert!(store.set_item("galleryImages", "[]").is_ok());
        drop(store);

        let Ok(reopened) = FileLocalStore::open(dir.path()) else {
            panic!("reopen");
        };
        assert_eq!(reopened.get_item("galleryImages"), Ok(Some("[]".to_string())));
        assert!(reopened.remove_item("galleryImages").is_ok());
        assert_eq!(reopened.get_item("galleryImages"), Ok(None));
    }

    #[test]
    fn file_store_enforces_quota() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(store) = FileLocalStore::open_with_quota(dir.path(), 16) else {
            panic!("open");
        };
        assert!(store.set_item("a", "0123456789").is_ok());
        assert!(matches!(
            store.set_item("b", "0123456789"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.get_item("b"), Ok(None));
    }

    #[test]
    fn file_store_tracks_usage_across_reopen() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(store) = FileLocalStore::open_with_quota(dir.path(), 24) else {
            panic!("open");
        };
        assert!(store.set_item("a", "0123456789").is_ok());
        // Replacing a value only counts the new size.
        assert!(store.set_item("a", "01234").is_ok());
        assert_eq!(store.used_bytes(), Ok(6));
        drop(store);

        let Ok(reopened) = FileLocalStore::open_with_quota(dir.path(), 24) else {
            panic!("reopen");
        };
        assert_eq!(reopened.used_bytes(), Ok(6));
        assert!(matches!(
            reopened.set_item("b", "0123456789012345678"),
            Err(StorageError::QuotaExceeded { needed: 26, quota: 24 })
        ));
        assert!(reopened.remove_item("a").is_ok());
        assert_eq!(reopened.used_bytes(), Ok(0));
        assert!(reopened.set_item("b", "0123456789012345678").is_ok());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(store) = FileLocalStore::open(dir.path()) else {
            panic!("open");
        };
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                store.set_item(key, "v"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
