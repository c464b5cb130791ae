//! Key-Value Store Port - client-side persistence scopes.
//!
//! Values are JSON documents under namespaced string keys. Absence and
//! corruption are both "not yet initialized" to callers; only transport
//! problems surface as [`StorageError`].

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Errors that can occur during storage operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize value: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize value: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl StorageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StorageError::DeserializationFailed(_) => ErrorCode::CorruptValue,
            _ => ErrorCode::StorageUnavailable,
        }
    }
}

/// Namespaced storage key, rendered as `namespace:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Creates a key under `namespace`; both parts must be non-empty.
    pub fn namespaced(namespace: &str, name: &str) -> Result<Self, ValidationError> {
        if namespace.trim().is_empty() {
            return Err(ValidationError::empty_field("namespace"));
        }
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("key"));
        }
        Ok(Self(format!("{}:{}", namespace, name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port for a key/value persistence scope.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, `None` if absent.
    async fn get(&self, key: &StorageKey) -> Result<Option<Value>, StorageError>;

    /// Replaces the value under `key` in a single write.
    async fn set(&self, key: &StorageKey, value: Value) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError>;
}

/// The two client storage scopes.
///
/// `persistent` outlives sessions (aggregate stats, long-lived counters);
/// `session` lasts one visit (stable variant buckets).
#[derive(Clone)]
pub struct StorageScopes {
    pub persistent: Arc<dyn KeyValueStore>,
    pub session: Arc<dyn KeyValueStore>,
}

impl StorageScopes {
    pub fn new(persistent: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self {
            persistent,
            session,
        }
    }
}

impl fmt::Debug for StorageScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageScopes").finish_non_exhaustive()
    }
}
