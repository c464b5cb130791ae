//! Outcome labels and the pure scoring seam.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::{ChoiceSequence, InteractionError};

/// A label from an experiment's fixed outcome catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeLabel(String);

impl OutcomeLabel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed, ordered set of labels an experiment can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCatalog {
    labels: Vec<OutcomeLabel>,
}

impl LabelCatalog {
    /// Creates a catalog; labels must be non-empty and distinct.
    pub fn new<I, S>(labels: I) -> Result<Self, InteractionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for label in labels {
            let label: String = label.into();
            if label.trim().is_empty() {
                return Err(InteractionError::UnknownLabel(label));
            }
            if !seen.insert(label.clone()) {
                return Err(InteractionError::DuplicateLabel(label));
            }
            out.push(OutcomeLabel(label));
        }
        if out.is_empty() {
            return Err(InteractionError::UnknownLabel(String::new()));
        }
        Ok(Self { labels: out })
    }

    /// Returns the catalog's label with this name.
    pub fn label(&self, name: &str) -> Result<&OutcomeLabel, InteractionError> {
        self.labels
            .iter()
            .find(|l| l.0 == name)
            .ok_or_else(|| InteractionError::UnknownLabel(name.to_string()))
    }

    pub fn contains(&self, label: &OutcomeLabel) -> bool {
        self.labels.contains(label)
    }

    pub fn labels(&self) -> &[OutcomeLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Result of scoring a complete choice sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub label: OutcomeLabel,
    /// Named scores shown next to the label (e.g. normalised trait shares).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<String, u8>,
}

impl Classification {
    pub fn new(label: OutcomeLabel) -> Self {
        Self {
            label,
            scores: BTreeMap::new(),
        }
    }

    pub fn with_score(mut self, name: impl Into<String>, value: u8) -> Self {
        self.scores.insert(name.into(), value);
        self
    }
}

/// Pure, deterministic scoring function for an experiment.
///
/// The same instance classifies the real session and every counterfactual,
/// so "current" and "alternate" results can never disagree on the rules.
/// Implementations must only return labels from their own catalog.
pub trait Classifier: Send + Sync {
    fn catalog(&self) -> &LabelCatalog;

    fn classify(&self, sequence: &ChoiceSequence) -> Classification;
}
