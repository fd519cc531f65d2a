//! Logical keys the policy persists.

use strum::{AsRefStr, EnumIter};

const KEY_NAMESPACE: &str = "applock";

/// Every scalar the policy reads or writes through the [`super::KeyValueStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum StorageKey {
    /// Digest of the user's PIN.
    PinHash,
    /// Unix timestamp of the last successful unlock.
    LastUnlockAt,
    /// Unix timestamp at which the retry limit was reached.
    RetryLockedAt,
    /// Failed attempts in the current retry window.
    RetryAttempt,
    /// Un-namespaced SHA-1 record written by 1.x releases. Read as a fallback
    /// for [`Self::PinHash`] and removed once a new record is written.
    #[strum(serialize = "al__pin_data")]
    LegacyPinHash,
}

impl StorageKey {
    /// Namespaced key handed to the host store, e.g. `applock.pin_hash`.
    #[must_use]
    pub fn storage_key(self) -> String {
        match self {
            Self::LegacyPinHash => self.as_ref().to_string(),
            _ => format!("{KEY_NAMESPACE}.{}", self.as_ref()),
        }
    }
}
