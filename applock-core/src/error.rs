use thiserror::Error;

use crate::storage::StorageError;

/// Error outputs from `AppLock`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum AppLockError {
    /// The entered PIN does not have the configured number of characters
    #[error("length_invalid: expected {expected} characters, got {actual}")]
    LengthInvalid {
        /// Configured PIN length.
        expected: u32,
        /// Length of the rejected entry.
        actual: u32,
    },
    /// The entered PIN does not match the stored one
    #[error("mismatch: {remaining_attempts} attempts remaining")]
    Mismatch {
        /// Attempts left before the lockout engages.
        remaining_attempts: u32,
    },
    /// The confirmation entry differs from the first entry during creation
    #[error("entry_mismatch")]
    EntryMismatch,
    /// Too many failed attempts; verification is blocked until the lockout window ends
    #[error("retry_exceeded: unlock allowed at {unlock_allowed_at}")]
    RetryExceeded {
        /// Unix timestamp at which verification is permitted again.
        unlock_allowed_at: u64,
    },
    /// A PIN is already set; unlock or reset before creating a new one
    #[error("already_exists")]
    AlreadyExists,
    /// No PIN is set, so there is nothing to verify against
    #[error("no_pin")]
    NoPin,
    /// The supplied configuration cannot be used
    #[error("invalid_config: {field} {reason}")]
    InvalidConfig {
        /// Offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The host store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppLockError {
    /// Returns `true` when the user can act on the error (re-enter, wait, or reset).
    ///
    /// Storage and configuration failures are for the host to handle.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::InvalidConfig { .. })
    }
}
