//! PIN creation, verification and lockout policy for on-device app locks.
//!
//! The host application owns rendering and input; this crate decides whether a
//! PIN may be created or verified, counts failed attempts, engages and lifts
//! the lockout, and tracks how long an unlock stays valid. State is persisted
//! through a [`KeyValueStore`] the host provides.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use applock_core::{AppLockConfig, AppLockError, MemoryKeyValueStore, PinPolicy};
//!
//! let store = Arc::new(MemoryKeyValueStore::new());
//! let policy = PinPolicy::new(store, AppLockConfig::default()).unwrap();
//!
//! policy.create("1234", "1234").unwrap();
//! assert!(matches!(
//!     policy.verify("0000", 1_700_000_000),
//!     Err(AppLockError::Mismatch { remaining_attempts: 4 })
//! ));
//! assert!(policy.verify("1234", 1_700_000_001).is_ok());
//! assert!(policy.session_valid(1_700_000_002).unwrap());
//! ```

mod config;
pub use config::*;

mod digest;
pub use digest::*;

mod error;
pub use error::*;

mod policy;
pub use policy::*;

pub mod logger;
pub mod storage;
pub use storage::{KeyValueStore, MemoryKeyValueStore, StorageError};

#[cfg(feature = "ffi")]
mod ffi;
#[cfg(feature = "ffi")]
pub use ffi::*;

/// Result type for lock operations.
pub type AppLockResult<T, E = AppLockError> = std::result::Result<T, E>;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("applock_core");
