//! Fleet Store - persistence core for a fleet control plane
//!
//! Stores agents, users, roles, credentials, verifiers and sessions behind a
//! single [`storage::Storage`] interface. Every entity kind gets its own
//! concurrency-safe store with stable, opaque-cursor pagination ordered by
//! most recent update first.
//!
//! ```
//! use fleet_store::storage::{Context, ListOptions, MemoryStorage, Storage};
//! use fleet_store::types::{Agent, Timestamp};
//!
//! let storage = MemoryStorage::new();
//! let ctx = Context::background();
//! storage
//!     .create_agent(&ctx, &Agent::new("a1", "edge-01", "linux", Timestamp::now()))
//!     .unwrap();
//! let page = storage.list_agents(&ctx, None, &ListOptions::default()).unwrap();
//! assert_eq!(page.items.len(), 1);
//! ```
#![warn(missing_docs)]

// Core foundational modules
pub mod constants;
pub mod core;
pub mod types;

// Main functional modules
pub mod storage;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::Config;
pub use storage::{Context, ListOptions, ListResult, MemoryStorage, Storage};
pub use types::{Error, ErrorKind, Result};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging and metrics from configuration
pub fn init(config: &Config) -> Result<()> {
    crate::core::init_logging(&config.logging)?;
    system::metrics::set_enabled(config.metrics.enable_prometheus);

    log_info!("Initializing {} v{}", NAME, VERSION);
    Ok(())
}
