//! # portcullis-storage
//!
//! Key/value storage backends for the session token store and the CSRF
//! cookie.
//!
//! - `memory` — process-lifetime storage backed by `dashmap`
//! - `file` — a JSON object on disk, shared by every process that opens it

#[cfg(feature = "memory")]
pub mod memory;
pub mod file;

use std::sync::Arc;

use tracing::info;

use portcullis_core::config::{StorageBackend, StorageConfig};
use portcullis_core::result::AppResult;
use portcullis_core::traits::KeyValueStorage;

pub use file::FileStorage;
#[cfg(feature = "memory")]
pub use memory::MemoryStorage;

/// Open the storage backend selected by configuration.
pub fn open_storage(config: &StorageConfig) -> AppResult<Arc<dyn KeyValueStorage>> {
    info!(backend = %config.backend, "Opening session storage");
    match config.backend {
        #[cfg(feature = "memory")]
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        #[cfg(not(feature = "memory"))]
        StorageBackend::Memory => Err(portcullis_core::AppError::configuration(
            "memory storage backend is not compiled in",
        )),
        StorageBackend::File => Ok(Arc::new(FileStorage::open(&config.path)?)),
    }
}
