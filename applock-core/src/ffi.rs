//! Swift and Kotlin bindings for the lock policy.
//!
//! # Example (Swift)
//!
//! ```swift
//! let lock = try AppLock(store: KeychainStore(), config: defaultAppLockConfig())
//!
//! if try lock.unlockRequiredNow() {
//!     do {
//!         _ = try lock.verifyNow(candidate: enteredPin)
//!     } catch AppLockError.RetryExceeded(let message) {
//!         showCountdown(message)
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use zeroize::Zeroizing;

use crate::{
    AppLockConfig, AppLockError, KeyValueStore, PinPolicy, PolicyStatus, Unlocked,
};

/// App lock handle exported to foreign hosts.
///
/// Methods taking `now` expect unix seconds; the `*_now` variants read the
/// system clock.
#[derive(uniffi::Object)]
pub struct AppLock {
    policy: PinPolicy,
}

#[uniffi::export]
impl AppLock {
    /// Creates a lock over the host store.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    #[uniffi::constructor]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        config: AppLockConfig,
    ) -> Result<Arc<Self>, AppLockError> {
        Ok(Arc::new(Self {
            policy: PinPolicy::new(store, config)?,
        }))
    }

    /// Configuration the lock was created with.
    #[must_use]
    pub fn config(&self) -> AppLockConfig {
        self.policy.config().clone()
    }

    /// Whether a PIN has been created.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn pin_exists(&self) -> Result<bool, AppLockError> {
        self.policy.pin_exists()
    }

    /// Whether the session opened by the last unlock is still valid at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn session_valid(&self, now: u64) -> Result<bool, AppLockError> {
        self.policy.session_valid(now)
    }

    /// Whether the session opened by the last unlock is still valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn session_valid_now(&self) -> Result<bool, AppLockError> {
        self.session_valid(current_unix_timestamp())
    }

    /// Whether the PIN has to be entered at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn unlock_required(&self, now: u64) -> Result<bool, AppLockError> {
        self.policy.unlock_required(now)
    }

    /// Whether the PIN has to be entered right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn unlock_required_now(&self) -> Result<bool, AppLockError> {
        self.unlock_required(current_unix_timestamp())
    }

    /// Whether a verification attempt may be made at `now`. An elapsed
    /// lockout is lifted first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn retry_allowed(&self, now: u64) -> Result<bool, AppLockError> {
        self.policy.reconcile_lockout_expiry(now)?;
        self.policy.retry_allowed(now)
    }

    /// Whether a verification attempt may be made right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn retry_allowed_now(&self) -> Result<bool, AppLockError> {
        self.retry_allowed(current_unix_timestamp())
    }

    /// Lock state at `now` for rendering prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn status(&self, now: u64) -> Result<PolicyStatus, AppLockError> {
        self.policy.status(now)
    }

    /// Current lock state for rendering prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn status_now(&self) -> Result<PolicyStatus, AppLockError> {
        self.status(current_unix_timestamp())
    }

    /// Checks `candidate` at `now`.
    ///
    /// # Errors
    ///
    /// See [`PinPolicy::verify`].
    pub fn verify(&self, candidate: String, now: u64) -> Result<Unlocked, AppLockError> {
        let candidate = Zeroizing::new(candidate);
        self.policy.verify(&candidate, now)
    }

    /// Checks `candidate` against the system clock.
    ///
    /// # Errors
    ///
    /// See [`PinPolicy::verify`].
    pub fn verify_now(&self, candidate: String) -> Result<Unlocked, AppLockError> {
        self.verify(candidate, current_unix_timestamp())
    }

    /// Creates the PIN and returns the persisted record.
    ///
    /// # Errors
    ///
    /// See [`PinPolicy::create`].
    pub fn create(
        &self,
        first_entry: String,
        second_entry: String,
    ) -> Result<String, AppLockError> {
        let first_entry = Zeroizing::new(first_entry);
        let second_entry = Zeroizing::new(second_entry);
        Ok(self.policy.create(&first_entry, &second_entry)?.encode())
    }

    /// Replaces the PIN after verifying the current one at `now`.
    ///
    /// # Errors
    ///
    /// See [`PinPolicy::change`].
    pub fn change(
        &self,
        current: String,
        first_entry: String,
        second_entry: String,
        now: u64,
    ) -> Result<String, AppLockError> {
        let current = Zeroizing::new(current);
        let first_entry = Zeroizing::new(first_entry);
        let second_entry = Zeroizing::new(second_entry);
        Ok(self
            .policy
            .change(&current, &first_entry, &second_entry, now)?
            .encode())
    }

    /// Replaces the PIN after verifying the current one against the system clock.
    ///
    /// # Errors
    ///
    /// See [`PinPolicy::change`].
    pub fn change_now(
        &self,
        current: String,
        first_entry: String,
        second_entry: String,
    ) -> Result<String, AppLockError> {
        self.change(current, first_entry, second_entry, current_unix_timestamp())
    }

    /// Erases the PIN, the session and the retry state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self) -> Result<(), AppLockError> {
        self.policy.clear()
    }
}

/// Default configuration, for hosts that only want to override a few fields.
#[uniffi::export]
#[must_use]
pub fn default_app_lock_config() -> AppLockConfig {
    AppLockConfig::default()
}

/// Parses a JSON configuration document.
///
/// # Errors
///
/// Returns [`AppLockError::InvalidConfig`] if the document is invalid.
#[uniffi::export]
pub fn app_lock_config_from_json(json: String) -> Result<AppLockConfig, AppLockError> {
    AppLockConfig::from_json(&json)
}

fn current_unix_timestamp() -> u64 {
    // A clock before the epoch reads as 0, which expires every session.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
