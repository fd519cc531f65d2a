//! Error types for the persistence layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while reading or writing lock state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
pub enum StorageError {
    /// The host key-value store refused or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A persisted value could not be decoded.
    #[error("corrupted value for `{key}`: {reason}")]
    Corrupted {
        /// Logical key holding the bad value.
        key: String,
        /// What failed to parse.
        reason: String,
    },

    /// Unexpected `UniFFI` callback error.
    #[cfg(feature = "ffi")]
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl StorageError {
    pub(crate) fn corrupted(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupted {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "ffi")]
impl From<uniffi::UnexpectedUniFFICallbackError> for StorageError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}
