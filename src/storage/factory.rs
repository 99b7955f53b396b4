//! Storage factory for creating storage implementations based on configuration

use crate::core::config::{StorageConfig, StorageType};
use crate::storage::{MemoryStorage, Storage};
use crate::types::error::{Error, Result};
use crate::{log_info, log_warn};
use std::sync::Arc;

/// Storage handle shared across request handlers
pub type SharedStorage = Arc<dyn Storage>;

/// Create a storage implementation based on configuration
pub fn create_storage(config: &StorageConfig) -> Result<SharedStorage> {
    config.validate()?;
    match config.storage_type {
        StorageType::Memory => {
            log_info!(
                "Using memory storage (default page {}, max page {})",
                config.default_page_size,
                config.max_page_size
            );
            Ok(Arc::new(MemoryStorage::with_config(config)))
        }
        other => {
            log_warn!("Storage type {} is not available", other);
            Err(Error::not_supported(format!("storage type {other}")))
        }
    }
}
