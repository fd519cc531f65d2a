//! Policy configuration supplied by the host application.

use serde::{Deserialize, Serialize};

use crate::digest::DigestAlgorithm;
use crate::error::AppLockError;

/// Default number of PIN characters.
pub const DEFAULT_PIN_LENGTH: u32 = 4;
/// Default number of failed attempts before the lockout engages.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default time after an unlock during which no re-prompt is needed (15 minutes).
pub const DEFAULT_SESSION_EXPIRATION_SECONDS: u64 = 60 * 15;
/// Default lockout window (5 minutes).
pub const DEFAULT_LOCKOUT_DURATION_SECONDS: u64 = 60 * 5;

/// Lock policy settings.
///
/// Fixed for the lifetime of a [`crate::PinPolicy`]; build a new policy to change them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default, deny_unknown_fields)]
pub struct AppLockConfig {
    /// Digest used for newly written PIN records.
    pub algorithm: DigestAlgorithm,
    /// Number of characters a PIN must have.
    pub pin_length: u32,
    /// Failed attempts allowed before the lockout engages.
    pub max_attempts: u32,
    /// Seconds after an unlock during which the session stays valid.
    pub session_expiration_seconds: u64,
    /// Seconds verification stays blocked once the attempt limit is hit.
    pub lockout_duration_seconds: u64,
}

impl Default for AppLockConfig {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            pin_length: DEFAULT_PIN_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            session_expiration_seconds: DEFAULT_SESSION_EXPIRATION_SECONDS,
            lockout_duration_seconds: DEFAULT_LOCKOUT_DURATION_SECONDS,
        }
    }
}

impl AppLockConfig {
    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AppLockError::InvalidConfig`] if the document does not parse
    /// or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, AppLockError> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            AppLockError::InvalidConfig {
                field: "json".to_string(),
                reason: err.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AppLockError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AppLockError> {
        if self.pin_length == 0 {
            return Err(invalid("pin_length", "must be greater than zero"));
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be greater than zero"));
        }
        if self.session_expiration_seconds == 0 {
            return Err(invalid(
                "session_expiration_seconds",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> AppLockError {
    AppLockError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
