//! Logging abstraction
//!
//! Provides the crate-wide logging macros on top of `tracing`:
//! `log_info!`, `log_warn!`, `log_error!`, `log_debug!`, `log_trace!`.
//!
//! Call [`init_logging`] once at startup to install the fmt subscriber.
//! Without it (e.g. in tests) the macros are no-ops.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "line_trace_car=info,run_car=info";

/// Install the global fmt subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}
