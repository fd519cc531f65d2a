//! Typed access to the persisted lock state.

use std::str::FromStr;
use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::digest::PinHash;

use super::error::{StorageError, StorageResult};
use super::keys::StorageKey;
use super::traits::KeyValueStore;

/// Typed view over the host [`KeyValueStore`].
///
/// Missing values read as `None` (or `0` for the attempt counter). Values that
/// are present but cannot be decoded are reported as
/// [`StorageError::Corrupted`] rather than silently reset.
#[derive(Clone)]
pub struct PinRecords {
    store: Arc<dyn KeyValueStore>,
}

impl PinRecords {
    /// Wraps a host store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the stored PIN record, falling back to the 1.x key.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the record is malformed.
    pub fn pin_hash(&self) -> StorageResult<Option<PinHash>> {
        match self.read_parsed(StorageKey::PinHash)? {
            Some(hash) => Ok(Some(hash)),
            None => self.read_parsed(StorageKey::LegacyPinHash),
        }
    }

    /// Persists a PIN record and drops any 1.x record.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails.
    pub fn set_pin_hash(&self, hash: &PinHash) -> StorageResult<()> {
        self.write(StorageKey::PinHash, Some(hash.encode()))?;
        self.write(StorageKey::LegacyPinHash, None)
    }

    /// Reads the last successful unlock timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the value is malformed.
    pub fn last_unlock_at(&self) -> StorageResult<Option<u64>> {
        self.read_parsed(StorageKey::LastUnlockAt)
    }

    /// Records a successful unlock.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_last_unlock_at(&self, at: u64) -> StorageResult<()> {
        self.write(StorageKey::LastUnlockAt, Some(at.to_string()))
    }

    /// Reads the timestamp at which the current lockout began.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the value is malformed.
    pub fn retry_locked_at(&self) -> StorageResult<Option<u64>> {
        self.read_parsed(StorageKey::RetryLockedAt)
    }

    /// Sets or clears the lockout start.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_retry_locked_at(&self, at: Option<u64>) -> StorageResult<()> {
        self.write(StorageKey::RetryLockedAt, at.map(|at| at.to_string()))
    }

    /// Reads the failed attempt counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the value is malformed.
    pub fn retry_attempt(&self) -> StorageResult<u32> {
        Ok(self.read_parsed(StorageKey::RetryAttempt)?.unwrap_or(0))
    }

    /// Stores the failed attempt counter. Zero removes the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_retry_attempt(&self, attempt: u32) -> StorageResult<()> {
        let value = (attempt > 0).then(|| attempt.to_string());
        self.write(StorageKey::RetryAttempt, value)
    }

    /// Removes every key the policy owns.
    ///
    /// # Errors
    ///
    /// Returns the first failing delete.
    pub fn clear_all(&self) -> StorageResult<()> {
        for key in StorageKey::iter() {
            self.write(key, None)?;
        }
        Ok(())
    }

    fn read_parsed<T>(&self, key: StorageKey) -> StorageResult<Option<T>>
    where
        T: FromStr,
        T::Err: ToString,
    {
        self.store
            .get(key.storage_key())?
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|err| StorageError::corrupted(key.as_ref(), err.to_string()))
            })
            .transpose()
    }

    fn write(&self, key: StorageKey, value: Option<String>) -> StorageResult<()> {
        match value {
            Some(value) => self.store.set(key.storage_key(), value),
            None => self.store.remove(key.storage_key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DigestAlgorithm;
    use crate::storage::MemoryKeyValueStore;

    fn records() -> (Arc<MemoryKeyValueStore>, PinRecords) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let records = PinRecords::new(store.clone());
        (store, records)
    }

    #[test]
    fn test_missing_values_read_as_empty() {
        let (_, records) = records();
        assert!(records.pin_hash().unwrap().is_none());
        assert!(records.last_unlock_at().unwrap().is_none());
        assert!(records.retry_locked_at().unwrap().is_none());
        assert_eq!(records.retry_attempt().unwrap(), 0);
    }

    #[test]
    fn test_zero_attempt_removes_key() {
        let (store, records) = records();
        records.set_retry_attempt(3).unwrap();
        assert_eq!(store.len(), 1);
        records.set_retry_attempt(0).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupted_timestamp_is_reported() {
        let (store, records) = records();
        store
            .set(StorageKey::LastUnlockAt.storage_key(), "yesterday".to_string())
            .unwrap();
        match records.last_unlock_at() {
            Err(StorageError::Corrupted { key, .. }) => assert_eq!(key, "last_unlock_at"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_legacy_key_is_read_and_replaced() {
        let (store, records) = records();
        store
            .set(
                "al__pin_data".to_string(),
                "7110eda4d09e062aa5e4a390b0a572ac0d2c0220".to_string(),
            )
            .unwrap();

        let legacy = records.pin_hash().unwrap().unwrap();
        assert_eq!(legacy.algorithm(), DigestAlgorithm::Sha1);
        assert!(legacy.matches("1234"));

        records
            .set_pin_hash(&DigestAlgorithm::Sha256.digest("1234"))
            .unwrap();
        assert_eq!(store.keys(), vec!["applock.pin_hash".to_string()]);
    }

    #[test]
    fn test_clear_all_leaves_foreign_keys() {
        let (store, records) = records();
        store.set("host.theme".to_string(), "dark".to_string()).unwrap();
        records
            .set_pin_hash(&DigestAlgorithm::Sha256.digest("1234"))
            .unwrap();
        records.set_last_unlock_at(10).unwrap();
        records.set_retry_locked_at(Some(20)).unwrap();
        records.set_retry_attempt(2).unwrap();

        store
            .set("al__pin_data".to_string(), "stale".to_string())
            .unwrap();

        records.clear_all().unwrap();

        assert_eq!(store.keys(), vec!["host.theme".to_string()]);
    }
}
