//! CappedCounter - long-lived per-client counter with a "last value" memo.

use serde_json::Value;
use std::sync::Arc;

use crate::domain::stats::{CappedCount, DEFAULT_COUNTER_CAP};
use crate::ports::{KeyValueStore, StorageError, StorageKey};

/// Counter stored as a single value, saturating at `cap`.
#[derive(Clone)]
pub struct CappedCounter {
    store: Arc<dyn KeyValueStore>,
    key: StorageKey,
    last_key: Option<StorageKey>,
    cap: u32,
}

impl CappedCounter {
    pub fn new(store: Arc<dyn KeyValueStore>, key: StorageKey) -> Self {
        Self {
            store,
            key,
            last_key: None,
            cap: DEFAULT_COUNTER_CAP,
        }
    }

    pub fn with_cap(mut self, cap: u32) -> Self {
        self.cap = cap;
        self
    }

    /// Also remember the last bumped value under `key`.
    pub fn with_last_value_key(mut self, key: StorageKey) -> Self {
        self.last_key = Some(key);
        self
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Current count; zero when missing, unreadable or garbage.
    pub async fn value(&self) -> CappedCount {
        self.read().await.unwrap_or(CappedCount::ZERO)
    }

    /// Stored count, `None` when the store itself failed.
    async fn read(&self) -> Option<CappedCount> {
        match self.store.get(&self.key).await {
            Ok(Some(v)) => Some(CappedCount::from_stored(&v)),
            Ok(None) | Err(StorageError::DeserializationFailed(_)) => Some(CappedCount::ZERO),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, error_code = ?e.code(), "Failed to read counter");
                None
            }
        }
    }

    /// Last value passed to `bump`, if remembered.
    pub async fn last_value(&self) -> Option<String> {
        let key = self.last_key.as_ref()?;
        match self.store.get(key).await {
            Ok(Some(Value::String(s))) => Some(s),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read last counter value");
                None
            }
        }
    }

    /// Increments the counter and records `last`.
    ///
    /// Returns the new count when the write landed, `None` otherwise. A
    /// failed read skips the write so the stored count is never clobbered.
    pub async fn bump(&self, last: Option<&str>) -> Option<CappedCount> {
        let next = self.read().await?.bumped(self.cap);

        if let Err(e) = self.store.set(&self.key, Value::from(next.value())).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist counter");
            return None;
        }

        if let (Some(key), Some(last)) = (&self.last_key, last) {
            if let Err(e) = self.store.set(key, Value::String(last.to_string())).await {
                tracing::warn!(key = %key, error = %e, "Failed to persist last counter value");
            }
        }

        tracing::debug!(key = %self.key, count = next.value(), "Counter bumped");
        Some(next)
    }
}

impl std::fmt::Debug for CappedCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CappedCounter")
            .field("key", &self.key)
            .field("last_key", &self.last_key)
            .field("cap", &self.cap)
            .finish_non_exhaustive()
    }
}
