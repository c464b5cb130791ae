//! VariantAssigner - stable A/B bucket per visit.
//!
//! The first request draws a bucket and stores it in the session scope;
//! later requests read it back. Stored values that are not a valid bucket
//! are re-drawn.

use serde_json::Value;
use std::sync::Arc;

use crate::ports::{KeyValueStore, RandomSource, StorageKey};

/// Assigns and remembers variant buckets.
#[derive(Clone)]
pub struct VariantAssigner {
    store: Arc<dyn KeyValueStore>,
}

impl VariantAssigner {
    pub fn new(session_store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: session_store,
        }
    }

    /// Bucket in `0..variant_count` for `key`. `None` when `variant_count` is 0.
    pub async fn assign(
        &self,
        key: &StorageKey,
        variant_count: usize,
        rng: &mut dyn RandomSource,
    ) -> Option<usize> {
        if variant_count == 0 {
            return None;
        }

        match self.store.get(key).await {
            Ok(Some(Value::Number(n))) => {
                if let Some(bucket) = n.as_u64().map(|b| b as usize).filter(|b| *b < variant_count)
                {
                    return Some(bucket);
                }
                tracing::debug!(key = %key, stored = %n, "Stored variant out of range, re-drawing");
            }
            Ok(Some(Value::String(s))) => {
                // Older clients stored the bucket as a numeral string.
                if let Some(bucket) = s.parse::<usize>().ok().filter(|b| *b < variant_count) {
                    return Some(bucket);
                }
                tracing::debug!(key = %key, stored = %s, "Stored variant invalid, re-drawing");
            }
            Ok(Some(other)) => {
                tracing::debug!(key = %key, stored = %other, "Stored variant invalid, re-drawing");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read variant");
            }
        }

        let bucket = rng.pick_index(variant_count);
        if let Err(e) = self.store.set(key, Value::from(bucket as u64)).await {
            tracing::warn!(key = %key, error = %e, "Failed to persist variant");
        }
        Some(bucket)
    }
}

impl std::fmt::Debug for VariantAssigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantAssigner").finish_non_exhaustive()
    }
}
