//! DerivedStatsStore - "you are like N% of the people who finished this".
//!
//! One JSON blob per experiment in the persistent scope. Storage problems
//! never reach the caller: they are logged and the statistic is simply
//! unavailable.

use std::sync::Arc;

use crate::domain::foundation::Percentage;
use crate::domain::interaction::OutcomeLabel;
use crate::domain::stats::AggregateStats;
use crate::ports::{KeyValueStore, StorageKey};

use super::read_value;

/// Read-modify-write access to one experiment's `AggregateStats`.
#[derive(Clone)]
pub struct DerivedStatsStore {
    store: Arc<dyn KeyValueStore>,
    key: StorageKey,
}

impl DerivedStatsStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: StorageKey) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    /// Current stats. Missing, corrupt, inconsistent or unreadable blobs
    /// read as empty; `None` only when the store itself failed.
    async fn load(&self) -> Option<AggregateStats> {
        let stats: AggregateStats = match read_value(self.store.as_ref(), &self.key).await? {
            Some(stats) => stats,
            None => return Some(AggregateStats::default()),
        };
        if !stats.is_consistent() {
            tracing::warn!(
                key = %self.key,
                total = stats.total(),
                "Aggregate stats fail consistency check, treating as uninitialized"
            );
            return Some(AggregateStats::default());
        }
        Some(stats)
    }

    /// The stored stats, or empty stats when unavailable.
    pub async fn snapshot(&self) -> AggregateStats {
        self.load().await.unwrap_or_default()
    }

    /// Counts one completed session under `label`.
    ///
    /// Returns the updated stats when the write landed, `None` otherwise.
    /// Failures are logged at `warn` and never propagated.
    pub async fn record_completion(&self, label: &OutcomeLabel) -> Option<AggregateStats> {
        let mut stats = self.load().await?;
        stats.record(label.as_str());

        let value = match serde_json::to_value(&stats) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to serialize aggregate stats");
                return None;
            }
        };

        match self.store.set(&self.key, value).await {
            Ok(()) => {
                tracing::debug!(key = %self.key, label = %label, total = stats.total(), "Recorded completion");
                Some(stats)
            }
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    error_code = ?e.code(),
                    "Failed to persist aggregate stats"
                );
                None
            }
        }
    }

    /// Share of recorded completions with `label`.
    ///
    /// `None` when nothing has been recorded or the store cannot be read.
    pub async fn percentage_for(&self, label: &OutcomeLabel) -> Option<Percentage> {
        self.load().await?.percentage_for(label.as_str())
    }

    /// Deletes the stored blob.
    pub async fn reset(&self) {
        if let Err(e) = self.store.remove(&self.key).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to reset aggregate stats");
        }
    }
}

impl std::fmt::Debug for DerivedStatsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedStatsStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryKeyValueStore;
    use crate::domain::interaction::LabelCatalog;
    use serde_json::json;

    fn labels() -> LabelCatalog {
        LabelCatalog::new(["X", "Y"]).unwrap()
    }

    fn key() -> StorageKey {
        StorageKey::namespaced("odd", "ce_stats_v1").unwrap()
    }

    fn store_with(backing: &InMemoryKeyValueStore) -> DerivedStatsStore {
        DerivedStatsStore::new(Arc::new(backing.clone()), key())
    }

    #[tokio::test]
    async fn corrupt_file_document_recovers_on_next_completion() {
        use crate::adapters::storage::FileKeyValueStore;

        let dir = tempfile::tempdir().unwrap();
        let stats = DerivedStatsStore::new(Arc::new(FileKeyValueStore::new(dir.path())), key());
        let catalog = labels();
        let x = catalog.label("X").unwrap();

        stats.record_completion(x).await.unwrap();
        let mut entries = std::fs::read_dir(dir.path()).unwrap();
        let path = entries.next().unwrap().unwrap().path();
        std::fs::write(&path, "{not json").unwrap();

        let first = stats.record_completion(x).await.unwrap();
        assert_eq!(first.total(), 1);
        let second = stats.record_completion(x).await.unwrap();
        assert_eq!(second.total(), 2);
        assert_eq!(stats.percentage_for(x).await, Some(Percentage::HUNDRED));
    }

    #[tokio::test]
    async fn single_completion_is_one_hundred_percent() {
        let backing = InMemoryKeyValueStore::new();
        let stats = store_with(&backing);
        let catalog = labels();
        let x = catalog.label("X").unwrap();

        stats.record_completion(x).await;

        assert_eq!(stats.percentage_for(x).await, Some(Percentage::HUNDRED));
    }

    #[tokio::test]
    async fn two_labels_are_fifty_fifty() {
        let backing = InMemoryKeyValueStore::new();
        let stats = store_with(&backing);
        let catalog = labels();
        let (x, y) = (catalog.label("X").unwrap(), catalog.label("Y").unwrap());

        stats.record_completion(x).await;
        let updated = stats.record_completion(y).await.unwrap();

        assert_eq!(updated.total(), 2);
        assert_eq!(stats.percentage_for(x).await.map(|p| p.value()), Some(50));
        assert_eq!(stats.percentage_for(y).await.map(|p| p.value()), Some(50));
    }

    #[tokio::test]
    async fn nothing_recorded_means_no_percentage() {
        let backing = InMemoryKeyValueStore::new();
        let stats = store_with(&backing);
        let catalog = labels();

        assert_eq!(stats.percentage_for(catalog.label("X").unwrap()).await, None);
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let backing = InMemoryKeyValueStore::new();
        backing.fail_writes(true);
        let stats = store_with(&backing);
        let catalog = labels();
        let x = catalog.label("X").unwrap();

        assert!(stats.record_completion(x).await.is_none());
        assert_eq!(stats.percentage_for(x).await, None);
    }

    #[tokio::test]
    async fn read_failure_means_no_percentage() {
        let backing = InMemoryKeyValueStore::new();
        let stats = store_with(&backing);
        let catalog = labels();
        let x = catalog.label("X").unwrap();
        stats.record_completion(x).await;

        backing.fail_reads(true);

        assert_eq!(stats.percentage_for(x).await, None);
        assert!(stats.record_completion(x).await.is_none());
    }

    #[tokio::test]
    async fn corrupt_blob_is_uninitialized() {
        let backing = InMemoryKeyValueStore::new();
        backing.insert_raw(&key(), json!("garbage")).await;
        let stats = store_with(&backing);
        let catalog = labels();
        let x = catalog.label("X").unwrap();

        assert_eq!(stats.snapshot().await, AggregateStats::default());

        let updated = stats.record_completion(x).await.unwrap();
        assert_eq!(updated.total(), 1);
    }

    #[tokio::test]
    async fn inconsistent_blob_is_uninitialized() {
        let backing = InMemoryKeyValueStore::new();
        backing
            .insert_raw(&key(), json!({"total": 1, "byLabel": {"X": 5}}))
            .await;
        let stats = store_with(&backing);

        assert_eq!(stats.snapshot().await.total(), 0);
    }

    #[tokio::test]
    async fn reads_legacy_by_type_blob() {
        let backing = InMemoryKeyValueStore::new();
        backing
            .insert_raw(&key(), json!({"total": 4, "byType": {"X": 1, "Y": 3}}))
            .await;
        let stats = store_with(&backing);
        let catalog = labels();

        assert_eq!(
            stats.percentage_for(catalog.label("Y").unwrap()).await.map(|p| p.value()),
            Some(75)
        );
    }

    #[tokio::test]
    async fn reset_clears_stats() {
        let backing = InMemoryKeyValueStore::new();
        let stats = store_with(&backing);
        let catalog = labels();
        let x = catalog.label("X").unwrap();
        stats.record_completion(x).await;

        stats.reset().await;

        assert_eq!(stats.snapshot().await.total(), 0);
        assert!(backing.is_empty().await);
    }
}
