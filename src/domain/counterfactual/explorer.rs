//! AlternateOutcomeExplorer - "with one different choice you would have been…".

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::interaction::{
    ChoiceDomain, ChoiceSequence, Classification, Classifier, InteractionError, OptionIndex,
    OutcomeLabel,
};

/// Order in which flip candidates are tried.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOrder {
    /// Index 0 upwards.
    #[default]
    Ascending,
    /// The listed indices first (skipping any out of range), then the rest ascending.
    PreferredFirst(Vec<usize>),
}

impl ScanOrder {
    /// Expands the order into concrete indices for a sequence of `len`.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        match self {
            ScanOrder::Ascending => (0..len).collect(),
            ScanOrder::PreferredFirst(preferred) => {
                let mut out: Vec<usize> = Vec::with_capacity(len);
                for &i in preferred {
                    if i < len && !out.contains(&i) {
                        out.push(i);
                    }
                }
                for i in 0..len {
                    if !out.contains(&i) {
                        out.push(i);
                    }
                }
                out
            }
        }
    }
}

/// Which flip to show when no single flip changes the label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackFlip {
    /// Flip the most recent choice.
    #[default]
    Last,
    /// Flip a fixed index (clamped to the last index when out of range).
    Index(usize),
    /// Flip the first candidate index whose recorded choice is `option`,
    /// else `default`.
    FirstWithOption {
        candidates: Vec<usize>,
        option: OptionIndex,
        default: usize,
    },
}

impl FallbackFlip {
    fn resolve(&self, sequence: &ChoiceSequence) -> usize {
        let last = sequence.len().saturating_sub(1);
        match self {
            FallbackFlip::Last => last,
            FallbackFlip::Index(i) => (*i).min(last),
            FallbackFlip::FirstWithOption {
                candidates,
                option,
                default,
            } => candidates
                .iter()
                .copied()
                .find(|&i| sequence.get(i) == Some(*option))
                .unwrap_or(*default)
                .min(last),
        }
    }
}

/// A counterfactual: the sequence with one choice flipped and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateOutcome {
    pub index: usize,
    pub alternate_sequence: ChoiceSequence,
    pub alternate: Classification,
    /// False when this is the fallback flip and the label did not change.
    pub changed: bool,
}

impl AlternateOutcome {
    pub fn alternate_label(&self) -> &OutcomeLabel {
        &self.alternate.label
    }

    /// One-based step number, as shown to visitors.
    pub fn step_number(&self) -> usize {
        self.index + 1
    }
}

/// Recomputes classifications for single-choice flips.
///
/// Holds the same classifier the experiment uses for its real result.
#[derive(Clone)]
pub struct AlternateOutcomeExplorer {
    domain: ChoiceDomain,
    classifier: Arc<dyn Classifier>,
    scan_order: ScanOrder,
    fallback: FallbackFlip,
}

impl AlternateOutcomeExplorer {
    pub fn new(domain: ChoiceDomain, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            domain,
            classifier,
            scan_order: ScanOrder::default(),
            fallback: FallbackFlip::default(),
        }
    }

    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.scan_order = order;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackFlip) -> Self {
        self.fallback = fallback;
        self
    }

    /// Returns `sequence` with the choice at `index` replaced by its alternate.
    pub fn flip_at(
        &self,
        sequence: &ChoiceSequence,
        index: usize,
    ) -> Result<ChoiceSequence, InteractionError> {
        let current = sequence
            .get(index)
            .ok_or_else(|| InteractionError::index_out_of_range(index, sequence.len()))?;
        let alternate = self.domain.alternate(current)?;
        sequence.with_replaced(index, alternate)
    }

    /// Classifies `sequence` with the shared classifier.
    pub fn classify(&self, sequence: &ChoiceSequence) -> Classification {
        self.classifier.classify(sequence)
    }

    /// Finds the first flip, in scan order, whose label differs from `current`.
    ///
    /// # Edge Cases
    /// - Empty sequence: `Ok(None)`
    /// - No flip changes the label: the fallback flip with `changed = false`
    pub fn find_first_divergent_flip(
        &self,
        sequence: &ChoiceSequence,
        current: &OutcomeLabel,
    ) -> Result<Option<AlternateOutcome>, InteractionError> {
        if sequence.is_empty() {
            return Ok(None);
        }

        for index in self.scan_order.indices(sequence.len()) {
            let flipped = self.flip_at(sequence, index)?;
            let alternate = self.classify(&flipped);
            if alternate.label != *current {
                return Ok(Some(AlternateOutcome {
                    index,
                    alternate_sequence: flipped,
                    alternate,
                    changed: true,
                }));
            }
        }

        let index = self.fallback.resolve(sequence);
        let flipped = self.flip_at(sequence, index)?;
        let alternate = self.classify(&flipped);
        let changed = alternate.label != *current;
        Ok(Some(AlternateOutcome {
            index,
            alternate_sequence: flipped,
            alternate,
            changed,
        }))
    }
}

impl std::fmt::Debug for AlternateOutcomeExplorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlternateOutcomeExplorer")
            .field("domain", &self.domain)
            .field("scan_order", &self.scan_order)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}
