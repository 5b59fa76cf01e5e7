//! Key-value storage collaborators.
//!
//! The cart persists itself as one string value under one key, read and
//! written whole. [`Storage`] is that contract; [`MemoryStorage`] backs tests
//! and embedded use, [`FileStorage`] keeps one file per key on disk.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key cannot be used by this backend.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// Writing the value would exceed the backend's capacity.
    #[error("storage quota exceeded writing {key:?}: {size} bytes, quota {quota}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Size of the rejected value in bytes.
        size: usize,
        /// Configured capacity in bytes.
        quota: usize,
    },

    /// The stored bytes are not a string value.
    #[error("stored value for {key:?} is not valid UTF-8")]
    NotUtf8 {
        /// Key being read.
        key: String,
    },

    /// Underlying filesystem failure.
    #[error("storage I/O error on {path:?}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Whole-value string storage addressed by key.
pub trait Storage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or fails the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails the delete.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, optionally capped like a browser's `localStorage`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, uncapped store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `quota` bytes of values.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let size = self.used_excluding(key) + value.len();
            if size > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    size,
                    quota,
                });
            }
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed storage: the value for `key` lives in `<dir>/<key>.json`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated value behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage root. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key is empty or could
    /// escape the storage directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StorageError::NotUtf8 {
                key: key.to_owned(),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// Reject keys that are empty or would resolve outside the storage root.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let escapes = key == "." || key == ".." || key.contains(['/', '\\']);
    if key.is_empty() || escapes || key.chars().any(char::is_control) {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_missing() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("cart").unwrap(), None);
    }

    #[test]
    fn test_memory_set_replaces_whole_value() {
        let mut storage = MemoryStorage::new();
        storage.set("cart", "[1]").unwrap();
        storage.set("cart", "[2]").unwrap();
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("[2]"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_memory_quota() {
        let mut storage = MemoryStorage::with_quota(8);
        storage.set("a", "1234").unwrap();
        // Overwriting the same key only counts the new value.
        storage.set("a", "12345678").unwrap();

        let err = storage.set("b", "1").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                size: 9,
                quota: 8,
                ..
            }
        ));
        assert_eq!(storage.get("b").unwrap(), None);
    }

    #[test]
    fn test_memory_remove() {
        let mut storage = MemoryStorage::new();
        storage.set("cart", "[]").unwrap();
        storage.remove("cart").unwrap();
        storage.remove("cart").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("cart").unwrap(), None);
        storage.set("cart", "[]").unwrap();
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/cart.json").exists());
        assert!(!dir.path().join("nested/cart.json.tmp").exists());

        storage.remove("cart").unwrap();
        assert_eq!(storage.get("cart").unwrap(), None);
    }

    #[test]
    fn test_file_non_utf8_value() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cart.json"), [0xff, 0xfe, b'[', b']']).unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.get("cart"),
            Err(StorageError::NotUtf8 { ref key }) if key == "cart"
        ));
    }

    #[test]
    fn test_file_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        for key in ["", ".", "..", "../cart", "a/b", "a\\b"] {
            assert!(
                matches!(storage.get(key), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }
}
