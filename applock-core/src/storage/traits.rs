//! Platform interface for persisting lock state.

use super::error::StorageResult;

/// Key-value store provided by the host application.
///
/// On iOS this is typically backed by the keychain or `UserDefaults`, on
/// Android by `SharedPreferences`. Every value is a UTF-8 string; the policy
/// owns the encoding of what it stores.
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, key: String) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, key: String, value: String) -> StorageResult<()>;

    /// Removes the value stored under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn remove(&self, key: String) -> StorageResult<()>;
}
