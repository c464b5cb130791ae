//! Storage Adapters
//!
//! Implementations of the KeyValueStore port for per-client persistence.
//!
//! ## Available Adapters
//!
//! - **FileKeyValueStore** - One JSON file per key on disk
//! - **InMemoryKeyValueStore** - HashMap behind a lock (tests, session scope)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{storage_scopes, FileKeyValueStore, InMemoryKeyValueStore};
//!
//! // Production: file-backed persistent scope, in-memory session scope
//! let scopes = storage_scopes(&config.storage);
//!
//! // Testing: in-memory storage
//! let store = InMemoryKeyValueStore::new();
//! ```

mod file_key_value_store;
mod in_memory_key_value_store;

pub use file_key_value_store::FileKeyValueStore;
pub use in_memory_key_value_store::InMemoryKeyValueStore;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::ports::{KeyValueStore, StorageScopes};

/// Builds the persistent and session scopes described by `config`.
///
/// The session scope is always in memory: it lives as long as the process.
pub fn storage_scopes(config: &StorageConfig) -> StorageScopes {
    let persistent: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        StorageBackend::File => Arc::new(FileKeyValueStore::new(config.directory_path())),
    };
    tracing::debug!(backend = ?config.backend, namespace = %config.namespace, "Storage scopes ready");
    StorageScopes::new(persistent, Arc::new(InMemoryKeyValueStore::new()))
}
