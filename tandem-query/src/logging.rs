//! Logging setup for tandem, driven by environment variables.
//!
//! # Environment Variables
//!
//! - `TANDEM_DEBUG=true|1|yes` - Enable debug logging
//! - `TANDEM_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `TANDEM_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! Installing a subscriber requires the `tracing-subscriber` feature; without
//! it, events go to whatever subscriber the application installed.
//!
//! ```rust,no_run
//! use tandem_query::logging;
//!
//! // Call once at startup.
//! logging::init();
//! ```
//!
//! Loads log at `debug` (one event per executed request) and prefetch levels
//! and relationship dispatch at `trace`.

use std::env;
use std::fmt;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "TANDEM_DEBUG";
const LEVEL_VAR: &str = "TANDEM_LOG_LEVEL";
const FORMAT_VAR: &str = "TANDEM_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human-oriented output.
    Pretty,
    /// Single-line, human-oriented output.
    Compact,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Pretty => write!(f, "pretty"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Check if `TANDEM_DEBUG` enables debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The configured log level.
///
/// `TANDEM_LOG_LEVEL` wins when it names a level; otherwise `debug` when
/// `TANDEM_DEBUG` is set, `warn` when not.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var(LEVEL_VAR) {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The configured output format.
pub fn get_log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::parse(&f))
        .unwrap_or_default()
}

/// Filter directive covering every tandem crate at `level`.
pub fn filter_directive(level: &str) -> String {
    ["tandem", "tandem_query", "tandem_schema"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize logging. Subsequent calls are no-ops.
///
/// Nothing is installed unless `TANDEM_DEBUG` or `TANDEM_LOG_LEVEL` is set.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(filter_directive(level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));
            let registry = tracing_subscriber::registry().with(filter);

            match get_log_format() {
                LogFormat::Json => registry.with(fmt::layer().json()).init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
            }

            tracing::info!(level, format = %get_log_format(), "tandem logging initialized");
        }
    });
}

/// Initialize logging at a specific level.
///
/// # Safety
///
/// Sets `TANDEM_LOG_LEVEL`, which is unsound while other threads read the
/// environment. Call before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as startup-only, before threads exist.
    unsafe {
        env::set_var(LEVEL_VAR, level);
    }
    init();
}

/// Trace-level logging only when `TANDEM_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! tandem_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(
            filter_directive("trace"),
            "tandem=trace,tandem_query=trace,tandem_schema=trace"
        );
    }

    #[test]
    fn test_log_level_default() {
        // SAFETY: no other test in this crate touches these variables.
        unsafe {
            env::remove_var(DEBUG_VAR);
            env::remove_var(LEVEL_VAR);
        }
        assert!(!is_debug_enabled());
        assert_eq!(get_log_level(), "warn");
    }
}
