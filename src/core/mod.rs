//! Configuration and process setup

/// Application configuration
pub mod config;

/// Logging macros and subscriber setup
pub mod logging;

// Re-export commonly used items
pub use config::{load_config_or_default, Config, LoggingConfig, MetricsConfig, StorageConfig, StorageType};
pub use logging::init_logging;
