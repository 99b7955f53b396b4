//! Logging setup and macros
//!
//! Thin wrappers over `tracing` so call sites read the same everywhere, plus
//! [`init_logging`] to install the process-wide subscriber from configuration.

use crate::core::config::{LogFormat, LoggingConfig};
use crate::types::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Info level logging - general information messages
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        tracing::info!($($arg)*);
    }};
}

/// Warning level logging - potentially problematic situations
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        tracing::warn!($($arg)*);
    }};
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Installing twice
/// is reported as a `Config` error.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::config(format!("Invalid log level {:?}: {e}", config.level)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| Error::config(format!("Failed to install log subscriber: {e}")))
}
