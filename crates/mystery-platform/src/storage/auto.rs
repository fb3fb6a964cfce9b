//! Pick the message repository for the configured backend.
//!
//! Priority for `Auto`: REST (when a base url is configured) → Memory (fallback)

use std::rc::Rc;
use mystery_core::ports::MessageRepository;
use mystery_types::config::{StorageBackendType, StorageConfig};
use super::{MemoryRepository, RestRepository};

/// Returns a trait object so callers are backend-agnostic.
pub fn auto_detect_repository(config: &StorageConfig) -> Rc<dyn MessageRepository> {
    let rest_url = config.rest_url.as_deref().filter(|url| !url.is_empty());

    match (&config.backend, rest_url) {
        (StorageBackendType::Memory, _) => {
            log::info!("Storage backend: memory");
            Rc::new(MemoryRepository::new())
        }
        (StorageBackendType::Rest | StorageBackendType::Auto, Some(url)) => {
            log::info!("Storage backend: REST at {}", url);
            Rc::new(RestRepository::new(url, config.anon_key.clone()))
        }
        (StorageBackendType::Rest, None) => {
            log::warn!("REST storage selected but no url configured, falling back to memory");
            Rc::new(MemoryRepository::new())
        }
        (StorageBackendType::Auto, None) => {
            log::info!("Storage backend: memory (no REST url configured)");
            Rc::new(MemoryRepository::new())
        }
    }
}
