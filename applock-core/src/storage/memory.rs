//! In-memory [`KeyValueStore`] for tests and previews.
//!
//! Nothing is persisted across process restarts. Hosts can use it to exercise
//! their lock flows without a device store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{StorageError, StorageResult};
use super::traits::KeyValueStore;

/// Thread-safe in-memory key-value store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().expect("store lock poisoned").len()
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().expect("store lock poisoned").is_empty()
    }

    /// Sorted list of stored keys.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .values
            .read()
            .expect("store lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("mutex poisoned".to_string())
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: String) -> StorageResult<Option<String>> {
        let guard = self.values.read().map_err(|_| poisoned())?;
        Ok(guard.get(&key).cloned())
    }

    fn set(&self, key: String, value: String) -> StorageResult<()> {
        self.values
            .write()
            .map_err(|_| poisoned())?
            .insert(key, value);
        Ok(())
    }

    fn remove(&self, key: String) -> StorageResult<()> {
        self.values.write().map_err(|_| poisoned())?.remove(&key);
        Ok(())
    }
}
