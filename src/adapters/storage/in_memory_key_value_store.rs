//! In-Memory Key-Value Store Adapter
//!
//! Holds values in a shared map. Used for the per-session scope and in tests.
//! Write failures can be switched on to exercise degraded-storage paths.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{KeyValueStore, StorageError, StorageKey};

/// In-memory key/value scope
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<RwLock<HashMap<StorageKey, Value>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set`/`remove` fail with `Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `get` fail with `Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Writes a raw value, bypassing failure simulation (test seeding).
    pub async fn insert_raw(&self, key: &StorageKey, value: Value) {
        self.values.write().await.insert(key.clone(), value);
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.values.write().await.clear();
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<Value>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &StorageKey, value: Value) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values.write().await.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(name: &str) -> StorageKey {
        StorageKey::namespaced("test", name).unwrap()
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = InMemoryKeyValueStore::new();
        store.set(&key("a"), json!({"n": 1})).await.unwrap();

        assert_eq!(store.get(&key("a")).await.unwrap(), Some(json!({"n": 1})));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get(&key("missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_missing_is_ok() {
        let store = InMemoryKeyValueStore::new();
        store.remove(&key("missing")).await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryKeyValueStore::new();
        let other = store.clone();
        store.set(&key("a"), json!(1)).await.unwrap();

        assert_eq!(other.get(&key("a")).await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn failing_writes_leave_previous_value() {
        let store = InMemoryKeyValueStore::new();
        store.set(&key("a"), json!(1)).await.unwrap();
        store.fail_writes(true);

        let result = store.set(&key("a"), json!(2)).await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert_eq!(store.get(&key("a")).await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn failing_reads_error() {
        let store = InMemoryKeyValueStore::new();
        store.fail_reads(true);
        assert!(store.get(&key("a")).await.is_err());
    }
}
