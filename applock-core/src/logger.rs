//! Routes this crate's `log` output into the host app's own logging.
//!
//! The policy logs unlock outcomes, attempt counts and lockout timestamps,
//! never PINs or digests. Nothing is emitted until [`set_logger`] installs a
//! sink; Swift and Kotlin hosts implement [`Logger`] through the bindings.

use std::sync::{Arc, OnceLock};

/// Crate path used as the `log` target of every record this crate emits.
const CRATE_TARGET: &str = "applock_core";

/// Sink for log lines, implemented by the host app.
///
/// ```rust
/// use std::sync::Arc;
///
/// use applock_core::logger::{set_logger, LogLevel, Logger};
///
/// struct Stderr;
///
/// impl Logger for Stderr {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("applock {level:?}: {message}");
///     }
/// }
///
/// set_logger(Arc::new(Stderr));
/// ```
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait Logger: Sync + Send {
    /// Receives one formatted record.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LogLevel {
    /// Step-by-step detail.
    Trace,
    /// Diagnostics such as individual mismatches.
    Debug,
    /// Lifecycle events: PIN created, changed, cleared, lockout lifted.
    Info,
    /// Lockout engaged, record rewrite failed, inconsistent stored state.
    Warn,
    /// Failures the host should look at.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static HOST_LOGGER: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// `log` backend handing records to [`HOST_LOGGER`].
///
/// Records from this crate pass at every level. Records from dependencies
/// only pass at `Info` and above.
struct HostBridge;

impl log::Log for HostBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.target().starts_with(CRATE_TARGET) || metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !log::Log::enabled(self, record.metadata()) {
            return;
        }
        if let Some(logger) = HOST_LOGGER.get() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Installs the host sink. Only the first call takes effect.
///
/// Returns `false` when a sink was already installed, or when another `log`
/// backend owns the process; in the first case the rejected call is reported
/// through the sink already in place.
#[cfg_attr(feature = "ffi", uniffi::export)]
pub fn set_logger(logger: Arc<dyn Logger>) -> bool {
    if HOST_LOGGER.set(logger).is_err() {
        log::warn!("set_logger called again, keeping the first logger");
        return false;
    }

    static BRIDGE: HostBridge = HostBridge;
    if log::set_logger(&BRIDGE).is_err() {
        return false;
    }
    log::set_max_level(log::LevelFilter::Trace);
    true
}
