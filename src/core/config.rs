//! Configuration for the fleet store
//!
//! Settings are read from a TOML file, then overridden from `FLEET_STORE_*`
//! environment variables, then validated.

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, SCAN_BATCH_SIZE};
use crate::types::error::{Error, Result};
use crate::{log_info, log_warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Config file read by [`Config::load`] when present
pub const DEFAULT_CONFIG_FILE: &str = "fleet-store.toml";

/// Prefix for environment overrides
const ENV_PREFIX: &str = "FLEET_STORE_";

/// Available storage backend types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Process-local storage; nothing survives a restart
    #[default]
    Memory,
    /// Local disk storage (not available)
    Disk,
    /// Replicated storage (not available)
    Distributed,
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageType::Memory => "memory",
            StorageType::Disk => "disk",
            StorageType::Distributed => "distributed",
        })
    }
}

impl FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageType::Memory),
            "disk" => Ok(StorageType::Disk),
            "distributed" => Ok(StorageType::Distributed),
            other => Err(Error::config(format!("unknown storage type {other:?}"))),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!("unknown log format {other:?}"))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub storage_type: StorageType,

    /// Page size when a list call passes zero
    pub default_page_size: usize,

    /// Largest page a list call returns
    pub max_page_size: usize,

    /// Items scanned between cancellation checks
    pub scan_batch_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format
    pub format: LogFormat,
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Record Prometheus metrics for store operations
    pub enable_prometheus: bool,
}

impl StorageConfig {
    /// Validate page sizes and scan batch size
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(Error::config("Page sizes must be greater than zero"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(Error::config(format!(
                "Default page size {} exceeds max page size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.scan_batch_size == 0 {
            return Err(Error::config("Scan batch size must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Memory,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            scan_batch_size: SCAN_BATCH_SIZE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enable_prometheus: true }
    }
}

impl Config {
    /// Load `fleet-store.toml` if present, apply environment overrides and validate
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Config::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::config(format!("Failed to parse config file: {e}")))
    }

    /// Apply `FLEET_STORE_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from `lookup`, keyed without the `FLEET_STORE_` prefix
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("STORAGE_TYPE") {
            self.storage.storage_type = value.parse()?;
        }
        if let Some(value) = lookup("DEFAULT_PAGE_SIZE") {
            self.storage.default_page_size = parse_number("DEFAULT_PAGE_SIZE", &value)?;
        }
        if let Some(value) = lookup("MAX_PAGE_SIZE") {
            self.storage.max_page_size = parse_number("MAX_PAGE_SIZE", &value)?;
        }
        if let Some(value) = lookup("SCAN_BATCH_SIZE") {
            self.storage.scan_batch_size = parse_number("SCAN_BATCH_SIZE", &value)?;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = lookup("LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        if let Some(value) = lookup("METRICS") {
            self.metrics.enable_prometheus = value
                .parse()
                .map_err(|e| Error::config(format!("Invalid {ENV_PREFIX}METRICS: {e}")))?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;

        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(Error::config(format!("Invalid log level {other:?}"))),
        }

        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("Invalid {ENV_PREFIX}{key} {value:?}: {e}")))
}

/// Load and validate configuration from file
pub fn load_config(path: &str) -> Result<Config> {
    let config = Config::from_file(path)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from file or use defaults
pub fn load_config_or_default(path: Option<&str>) -> Config {
    match path {
        Some(path) => match load_config(path) {
            Ok(config) => {
                log_info!("Loaded configuration from: {}", path);
                config
            }
            Err(e) => {
                log_warn!("Failed to load config from {}: {}. Using defaults.", path, e);
                Config::default()
            }
        },
        None => {
            log_info!("No config file specified, using defaults");
            Config::default()
        }
    }
}
