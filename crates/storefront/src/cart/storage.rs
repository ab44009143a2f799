//! Durable key/value storage for carts.
//!
//! Each shopper gets its own storage namespace: a directory under the
//! configured cart directory, or a key prefix in the shared in-memory store.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "shopping_cart";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string key/value storage.
pub trait CartStorage: Send + Sync {
    /// Read the value under `key`; `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Write to a sibling temp file, then rename over the target.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process storage shared by every shopper when no cart directory is
/// configured. Also the test double: it counts writes and can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one value.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .values
            .lock()
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stored value, bypassing the trait.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .get(key)
            .cloned()
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A namespace inside a shared storage: keys are stored as `{scope}:{key}`.
#[derive(Clone)]
pub struct ScopedStorage {
    scope: String,
    storage: Arc<dyn CartStorage>,
}

impl ScopedStorage {
    #[must_use]
    pub fn new(scope: impl Into<String>, storage: Arc<dyn CartStorage>) -> Self {
        Self {
            scope: scope.into(),
            storage,
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}:{key}", self.scope)
    }
}

impl CartStorage for ScopedStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.read(&self.scoped(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.write(&self.scoped(key), value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pocket-mall-storage-{name}-{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = temp_dir("round-trip");
        let storage = FileStorage::new(dir.join("shopper"));

        assert_eq!(storage.read(CART_STORAGE_KEY).unwrap(), None);
        storage.write(CART_STORAGE_KEY, "[]").unwrap();
        storage.write(CART_STORAGE_KEY, r#"[{"productId":"1"}]"#).unwrap();
        assert_eq!(
            storage.read(CART_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"[{"productId":"1"}]"#)
        );
        assert!(!storage.dir().join(".shopping_cart.json.tmp").exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let storage = FileStorage::new(std::env::temp_dir());
        assert!(matches!(
            storage.write("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_memory_storage_failures_are_not_counted() {
        let storage = MemoryStorage::new();
        storage.write("k", "1").unwrap();
        storage.set_fail_writes(true);
        assert!(storage.write("k", "2").is_err());
        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.get("k").as_deref(), Some("1"));
    }

    #[test]
    fn test_scoped_storage_isolates_shoppers() {
        let shared: Arc<dyn CartStorage> = Arc::new(MemoryStorage::new());
        let alice = ScopedStorage::new("alice", shared.clone());
        let bob = ScopedStorage::new("bob", shared.clone());

        alice.write(CART_STORAGE_KEY, "[1]").unwrap();
        assert_eq!(alice.read(CART_STORAGE_KEY).unwrap().as_deref(), Some("[1]"));
        assert_eq!(bob.read(CART_STORAGE_KEY).unwrap(), None);
        assert_eq!(
            shared.read("alice:shopping_cart").unwrap().as_deref(),
            Some("[1]")
        );
    }
}
