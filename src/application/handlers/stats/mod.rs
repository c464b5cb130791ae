//! Stats handlers - persisted per-client tallies.
//!
//! - `DerivedStatsStore` - aggregate completion counts and percentages
//! - `CappedCounter` - long-lived counter with a last-value memo
//! - `VariantAssigner` - stable per-visit A/B buckets

mod capped_counter;
mod derived_stats_store;
mod variant_assigner;

pub use capped_counter::CappedCounter;
pub use derived_stats_store::DerivedStatsStore;
pub use variant_assigner::VariantAssigner;

use serde::de::DeserializeOwned;

use crate::ports::{KeyValueStore, StorageError, StorageKey};

/// Reads and decodes `key`.
///
/// `None` when the store failed; `Some(None)` when the key is absent or the
/// stored value does not decode. Both failure kinds are logged.
pub(crate) async fn read_value<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &StorageKey,
) -> Option<Option<T>> {
    let raw = match store.get(key).await {
        Ok(raw) => raw,
        Err(e @ StorageError::DeserializationFailed(_)) => {
            tracing::warn!(key = %key, error = %e, "Stored value is corrupt, treating as uninitialized");
            return Some(None);
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, error_code = ?e.code(), "Failed to read stored value");
            return None;
        }
    };

    let Some(raw) = raw else {
        return Some(None);
    };

    match serde_json::from_value(raw) {
        Ok(value) => Some(Some(value)),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Stored value is corrupt, treating as uninitialized");
            Some(None)
        }
    }
}
