//! PIN lifecycle, retry counting and lockout timing.
//!
//! All timestamps are unix seconds supplied by the caller, which keeps the
//! policy deterministic and lets hosts use whatever clock they trust.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::AppLockConfig;
use crate::digest::PinHash;
use crate::error::AppLockError;
use crate::storage::{KeyValueStore, PinRecords};
use crate::AppLockResult;

/// Outcome of a successful [`PinPolicy::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Unlocked {
    /// Time recorded as the start of the new session.
    pub unlocked_at: u64,
    /// `true` if the stored record was re-digested with the configured algorithm.
    pub migrated: bool,
}

/// Snapshot the presentation layer uses to pick a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct PolicyStatus {
    /// Whether a PIN has been created.
    pub pin_exists: bool,
    /// Whether the user has to enter the PIN now.
    pub unlock_required: bool,
    /// Failed attempts left before the lockout engages.
    pub remaining_attempts: u32,
    /// End of the current lockout window, if one is engaged.
    pub unlock_allowed_at: Option<u64>,
}

/// Decides whether a PIN may be created or verified and keeps the attempt
/// and lockout bookkeeping.
///
/// The policy holds no state of its own besides its configuration; everything
/// lives in the injected [`KeyValueStore`]. It is meant to be driven from a
/// single UI thread.
pub struct PinPolicy {
    records: PinRecords,
    config: AppLockConfig,
}

impl PinPolicy {
    /// Builds a policy over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`AppLockError::InvalidConfig`] if `config` does not validate.
    pub fn new(store: Arc<dyn KeyValueStore>, config: AppLockConfig) -> AppLockResult<Self> {
        config.validate()?;
        Ok(Self {
            records: PinRecords::new(store),
            config,
        })
    }

    /// Configuration the policy was built with.
    #[must_use]
    pub const fn config(&self) -> &AppLockConfig {
        &self.config
    }

    /// Returns `true` if a PIN record is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the record is malformed.
    pub fn pin_exists(&self) -> AppLockResult<bool> {
        Ok(self.records.pin_hash()?.is_some())
    }

    /// Returns `true` while `now` is within the session opened by the last unlock.
    ///
    /// A clock that reads earlier than the last unlock invalidates the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn session_valid(&self, now: u64) -> AppLockResult<bool> {
        let valid = self.records.last_unlock_at()?.is_some_and(|last| {
            now.checked_sub(last)
                .is_some_and(|elapsed| elapsed < self.config.session_expiration_seconds)
        });
        Ok(valid)
    }

    /// Returns `true` if a PIN exists and the session has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn unlock_required(&self, now: u64) -> AppLockResult<bool> {
        Ok(self.pin_exists()? && !self.session_valid(now)?)
    }

    /// Returns `true` once the failed attempt counter has reached the limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn retry_limit_exceeded(&self) -> AppLockResult<bool> {
        Ok(self.records.retry_attempt()? >= self.config.max_attempts)
    }

    /// Returns `true` if a verification attempt may be made at `now`.
    ///
    /// Call [`Self::reconcile_lockout_expiry`] first so an elapsed lockout is
    /// taken into account.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn retry_allowed(&self, now: u64) -> AppLockResult<bool> {
        if self.retry_limit_exceeded()? {
            return Ok(false);
        }
        let window_open = self
            .records
            .retry_locked_at()?
            .is_none_or(|locked_at| now >= self.lockout_end(locked_at));
        Ok(window_open)
    }

    /// Clears an elapsed lockout and resets the attempt counter.
    ///
    /// Idempotent. If the counter is at the limit but no lockout start was
    /// recorded, the lockout is engaged at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn reconcile_lockout_expiry(&self, now: u64) -> AppLockResult<()> {
        match self.records.retry_locked_at()? {
            Some(locked_at) if now >= self.lockout_end(locked_at) => {
                self.records.set_retry_locked_at(None)?;
                self.records.set_retry_attempt(0)?;
                info!("lockout window elapsed, attempts reset");
            }
            Some(_) => {}
            None if self.retry_limit_exceeded()? => {
                self.records.set_retry_locked_at(Some(now))?;
                warn!("attempt limit reached without a lockout start, locking at {now}");
            }
            None => {}
        }
        Ok(())
    }

    /// Failed attempts left before the lockout engages.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remaining_attempts(&self) -> AppLockResult<u32> {
        Ok(self
            .config
            .max_attempts
            .saturating_sub(self.records.retry_attempt()?))
    }

    /// End of the current lockout window, or `None` when not locked out.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn unlock_allowed_at(&self) -> AppLockResult<Option<u64>> {
        Ok(self
            .records
            .retry_locked_at()?
            .map(|locked_at| self.lockout_end(locked_at)))
    }

    /// Reconciles the lockout and reports the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn status(&self, now: u64) -> AppLockResult<PolicyStatus> {
        self.reconcile_lockout_expiry(now)?;
        Ok(PolicyStatus {
            pin_exists: self.pin_exists()?,
            unlock_required: self.unlock_required(now)?,
            remaining_attempts: self.remaining_attempts()?,
            unlock_allowed_at: self.unlock_allowed_at()?,
        })
    }

    /// Checks `candidate` against the stored PIN.
    ///
    /// A wrong PIN of the right length counts as a failed attempt; the attempt
    /// that reaches the limit engages the lockout and reports
    /// [`AppLockError::RetryExceeded`]. A correct PIN opens a new session and
    /// resets the counter. Records written with a different digest than the
    /// configured one are rewritten on success.
    ///
    /// # Errors
    ///
    /// - [`AppLockError::NoPin`] if no PIN has been created.
    /// - [`AppLockError::RetryExceeded`] while locked out.
    /// - [`AppLockError::LengthInvalid`] if `candidate` has the wrong length.
    /// - [`AppLockError::Mismatch`] if `candidate` is wrong.
    /// - [`AppLockError::Storage`] if the store fails.
    pub fn verify(&self, candidate: &str, now: u64) -> AppLockResult<Unlocked> {
        let stored = self.records.pin_hash()?.ok_or(AppLockError::NoPin)?;

        self.reconcile_lockout_expiry(now)?;
        if !self.retry_allowed(now)? {
            return Err(self.retry_exceeded(now)?);
        }

        self.check_length(candidate)?;

        if !stored.matches(candidate) {
            return Err(self.record_failed_attempt(now)?);
        }

        let migrated =
            stored.algorithm() != self.config.algorithm && self.migrate_record(&stored, candidate);

        self.records.set_last_unlock_at(now)?;
        self.records.set_retry_attempt(0)?;

        debug!("unlocked at {now}");
        Ok(Unlocked {
            unlocked_at: now,
            migrated,
        })
    }

    /// Creates the PIN from an entry and its confirmation.
    ///
    /// # Errors
    ///
    /// - [`AppLockError::AlreadyExists`] if a PIN is already stored.
    /// - [`AppLockError::LengthInvalid`] if either entry has the wrong length.
    /// - [`AppLockError::EntryMismatch`] if the entries differ.
    /// - [`AppLockError::Storage`] if the store fails.
    pub fn create(&self, first_entry: &str, second_entry: &str) -> AppLockResult<PinHash> {
        if self.pin_exists()? {
            return Err(AppLockError::AlreadyExists);
        }
        let hash = self.confirmed_hash(first_entry, second_entry)?;
        self.records.set_pin_hash(&hash)?;
        info!("PIN created with {}", hash.algorithm());
        Ok(hash)
    }

    /// Replaces the PIN after verifying the current one.
    ///
    /// The current PIN goes through [`Self::verify`], so a wrong entry counts
    /// toward the lockout.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::verify`] for `current`, then the length and
    /// confirmation errors of [`Self::create`] for the new entries.
    pub fn change(
        &self,
        current: &str,
        first_entry: &str,
        second_entry: &str,
        now: u64,
    ) -> AppLockResult<PinHash> {
        self.verify(current, now)?;
        let hash = self.confirmed_hash(first_entry, second_entry)?;
        self.records.set_pin_hash(&hash)?;
        info!("PIN changed");
        Ok(hash)
    }

    /// Erases the PIN, the session and the retry state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self) -> AppLockResult<()> {
        self.records.clear_all()?;
        info!("lock state cleared");
        Ok(())
    }

    fn confirmed_hash(&self, first_entry: &str, second_entry: &str) -> AppLockResult<PinHash> {
        self.check_length(first_entry)?;
        self.check_length(second_entry)?;

        let first = self.config.algorithm.digest(first_entry);
        let second = self.config.algorithm.digest(second_entry);
        if !first.ct_matches(&second) {
            return Err(AppLockError::EntryMismatch);
        }
        Ok(first)
    }

    fn migrate_record(&self, stored: &PinHash, candidate: &str) -> bool {
        match self
            .records
            .set_pin_hash(&self.config.algorithm.digest(candidate))
        {
            Ok(()) => {
                info!(
                    "PIN record migrated from {} to {}",
                    stored.algorithm(),
                    self.config.algorithm
                );
                true
            }
            Err(err) => {
                warn!(
                    "keeping {} PIN record, rewrite failed: {err}",
                    stored.algorithm()
                );
                false
            }
        }
    }

    fn check_length(&self, entry: &str) -> AppLockResult<()> {
        let actual = u32::try_from(entry.chars().count()).unwrap_or(u32::MAX);
        if actual == self.config.pin_length {
            Ok(())
        } else {
            Err(AppLockError::LengthInvalid {
                expected: self.config.pin_length,
                actual,
            })
        }
    }

    fn record_failed_attempt(&self, now: u64) -> AppLockResult<AppLockError> {
        let attempt = self
            .records
            .retry_attempt()?
            .saturating_add(1)
            .min(self.config.max_attempts);
        self.records.set_retry_attempt(attempt)?;

        if attempt >= self.config.max_attempts {
            self.records.set_retry_locked_at(Some(now))?;
            warn!(
                "attempt limit of {} reached, locked until {}",
                self.config.max_attempts,
                self.lockout_end(now)
            );
            return Ok(AppLockError::RetryExceeded {
                unlock_allowed_at: self.lockout_end(now),
            });
        }

        let remaining_attempts = self.config.max_attempts - attempt;
        debug!("PIN mismatch, {remaining_attempts} attempts remaining");
        Ok(AppLockError::Mismatch { remaining_attempts })
    }

    fn retry_exceeded(&self, now: u64) -> AppLockResult<AppLockError> {
        let unlock_allowed_at = self.unlock_allowed_at()?.unwrap_or(now);
        Ok(AppLockError::RetryExceeded { unlock_allowed_at })
    }

    const fn lockout_end(&self, locked_at: u64) -> u64 {
        locked_at.saturating_add(self.config.lockout_duration_seconds)
    }
}
