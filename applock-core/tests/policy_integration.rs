//! End-to-end checks of the PIN policy over in-memory and wrapped host stores.

use std::sync::Arc;

use applock_core::storage::{StorageKey, StorageResult};
use applock_core::{
    AppLockConfig, AppLockError, DigestAlgorithm, KeyValueStore, MemoryKeyValueStore, PinPolicy,
};
use test_case::test_case;

const T0: u64 = 1_700_000_000;

fn store() -> Arc<MemoryKeyValueStore> {
    Arc::new(MemoryKeyValueStore::new())
}

fn policy(store: &Arc<MemoryKeyValueStore>, config: AppLockConfig) -> PinPolicy {
    PinPolicy::new(store.clone(), config).expect("valid config")
}

fn sample_pins() -> impl Iterator<Item = String> {
    (0..10_000u32).step_by(373).map(|n| format!("{n:04}"))
}

#[test]
fn test_created_pin_always_unlocks() {
    for pin in sample_pins() {
        let store = store();
        let policy = policy(&store, AppLockConfig::default());
        policy.create(&pin, &pin).expect("create");
        let unlocked = policy.verify(&pin, T0).expect("verify");
        assert_eq!(unlocked.unlocked_at, T0);
    }
}

#[test]
fn test_differing_entries_never_persist() {
    for pin in sample_pins() {
        let other = format!("{:04}", (pin.parse::<u32>().unwrap() + 1) % 10_000);
        let store = store();
        let policy = policy(&store, AppLockConfig::default());
        assert_eq!(
            policy.create(&pin, &other).unwrap_err(),
            AppLockError::EntryMismatch
        );
        assert!(!policy.pin_exists().unwrap());
    }
}

#[test_case(DigestAlgorithm::Sha1)]
#[test_case(DigestAlgorithm::Sha256)]
#[test_case(DigestAlgorithm::Sha512)]
fn test_every_algorithm_round_trips(algorithm: DigestAlgorithm) {
    let store = store();
    let policy = policy(
        &store,
        AppLockConfig {
            algorithm,
            pin_length: 6,
            ..AppLockConfig::default()
        },
    );
    let hash = policy.create("246810", "246810").unwrap();
    assert_eq!(hash.algorithm(), algorithm);
    assert!(!policy.verify("246810", T0).unwrap().migrated);
}

#[test]
fn test_lockout_holds_for_the_whole_window() {
    let config = AppLockConfig {
        max_attempts: 3,
        lockout_duration_seconds: 60,
        ..AppLockConfig::default()
    };
    let store = store();
    let policy = policy(&store, config);
    policy.create("1234", "1234").unwrap();

    for offset in 0..2 {
        assert!(matches!(
            policy.verify("9999", T0 + offset),
            Err(AppLockError::Mismatch { .. })
        ));
    }
    assert_eq!(
        policy.verify("9999", T0 + 2).unwrap_err(),
        AppLockError::RetryExceeded {
            unlock_allowed_at: T0 + 62
        }
    );

    for now in (T0 + 3)..(T0 + 62) {
        for candidate in ["1234", "9999", "12"] {
            assert_eq!(
                policy.verify(candidate, now).unwrap_err(),
                AppLockError::RetryExceeded {
                    unlock_allowed_at: T0 + 62
                }
            );
        }
    }

    assert!(policy.verify("1234", T0 + 62).is_ok());
}

#[test]
fn test_state_survives_restart() {
    let config = AppLockConfig {
        max_attempts: 3,
        ..AppLockConfig::default()
    };
    let store = store();

    {
        let first_launch = policy(&store, config.clone());
        first_launch.create("1234", "1234").unwrap();
        let _ = first_launch.verify("0000", T0);
        let _ = first_launch.verify("0000", T0 + 1);
    }

    let second_launch = policy(&store, config);
    assert!(second_launch.pin_exists().unwrap());
    assert_eq!(second_launch.remaining_attempts().unwrap(), 1);
    assert!(matches!(
        second_launch.verify("0000", T0 + 2),
        Err(AppLockError::RetryExceeded { .. })
    ));
}

#[test]
fn test_persisted_layout() {
    let store = store();
    let policy = policy(&store, AppLockConfig::default());
    policy.create("1234", "1234").unwrap();
    let _ = policy.verify("0000", T0);
    policy.verify("1234", T0 + 5).unwrap();
    let _ = policy.verify("0000", T0 + 6);

    assert_eq!(
        store.keys(),
        vec![
            "applock.last_unlock_at".to_string(),
            "applock.pin_hash".to_string(),
            "applock.retry_attempt".to_string(),
        ]
    );
    assert_eq!(
        store
            .get(StorageKey::LastUnlockAt.storage_key())
            .unwrap()
            .as_deref(),
        Some("1700000005")
    );
    assert_eq!(
        store
            .get(StorageKey::RetryAttempt.storage_key())
            .unwrap()
            .as_deref(),
        Some("1")
    );
}

#[test]
fn test_session_lapses_after_expiration() {
    let config = AppLockConfig {
        session_expiration_seconds: 30,
        ..AppLockConfig::default()
    };
    let store = store();
    let policy = policy(&store, config);
    policy.create("1234", "1234").unwrap();
    policy.verify("1234", T0).unwrap();

    assert!(!policy.unlock_required(T0 + 29).unwrap());
    assert!(policy.unlock_required(T0 + 30).unwrap());
}

#[test]
fn test_config_from_json_drives_policy() {
    let config = AppLockConfig::from_json(
        r#"{"pin_length": 6, "max_attempts": 2, "lockout_duration_seconds": 10}"#,
    )
    .unwrap();
    let store = store();
    let policy = policy(&store, config);

    assert_eq!(
        policy.create("1234", "1234").unwrap_err(),
        AppLockError::LengthInvalid {
            expected: 6,
            actual: 4
        }
    );
    policy.create("123456", "123456").unwrap();
    let _ = policy.verify("000000", T0);
    assert_eq!(
        policy.verify("000000", T0).unwrap_err(),
        AppLockError::RetryExceeded {
            unlock_allowed_at: T0 + 10
        }
    );
}

#[test]
fn test_recoverable_errors() {
    assert!(AppLockError::Mismatch {
        remaining_attempts: 1
    }
    .is_recoverable());
    assert!(AppLockError::RetryExceeded {
        unlock_allowed_at: T0
    }
    .is_recoverable());
    assert!(AppLockError::EntryMismatch.is_recoverable());
    assert!(!AppLockError::Storage(applock_core::StorageError::Backend(
        "offline".to_string()
    ))
    .is_recoverable());
}

/// Store shared with a host that also keeps its own settings in it.
struct SharedPreferences {
    inner: MemoryKeyValueStore,
}

impl KeyValueStore for SharedPreferences {
    fn get(&self, key: String) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: String, value: String) -> StorageResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: String) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn test_clear_keeps_host_settings() {
    let prefs = Arc::new(SharedPreferences {
        inner: MemoryKeyValueStore::new(),
    });
    prefs
        .set("host.onboarding_done".to_string(), "true".to_string())
        .unwrap();

    let policy = PinPolicy::new(prefs.clone(), AppLockConfig::default()).unwrap();
    policy.create("1234", "1234").unwrap();
    policy.verify("1234", T0).unwrap();
    policy.clear().unwrap();

    assert!(!policy.pin_exists().unwrap());
    assert_eq!(prefs.inner.keys(), vec!["host.onboarding_done".to_string()]);
}
