//! Aggregate completion counts and the derived "like N% of others" figure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Percentage;

/// Per-client tally of completed sessions by outcome label.
///
/// # Invariants
///
/// - `sum(count_by_label) <= total`
/// - counts only ever grow; the only way down is an explicit reset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(default)]
    total: u64,

    #[serde(default, rename = "byLabel", alias = "byType")]
    count_by_label: BTreeMap<String, u64>,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count_for(&self, label: &str) -> u64 {
        self.count_by_label.get(label).copied().unwrap_or(0)
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, u64)> {
        self.count_by_label.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Counts one completed session with `label`.
    pub fn record(&mut self, label: &str) {
        self.total = self.total.saturating_add(1);
        let count = self.count_by_label.entry(label.to_string()).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Share of completions with `label`, rounded and floored at 1%.
    ///
    /// `None` when nothing has been recorded yet.
    pub fn percentage_for(&self, label: &str) -> Option<Percentage> {
        Percentage::of_ratio(self.count_for(label), self.total).map(|p| p.at_least(1))
    }

    /// True when the per-label counts fit inside the total.
    pub fn is_consistent(&self) -> bool {
        self.count_by_label
            .values()
            .try_fold(0u64, |acc, v| acc.checked_add(*v))
            .map_or(false, |sum| sum <= self.total)
    }
}
