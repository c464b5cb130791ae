//! ExperimentDefinition - every per-experiment constant in one place.

use std::fmt;
use std::sync::Arc;

use crate::domain::counterfactual::{AlternateOutcomeExplorer, FallbackFlip, ScanOrder};
use crate::domain::foundation::{DivergenceProbability, ExperimentId, ValidationError};
use crate::domain::interaction::{ChoiceDomain, Classifier, InteractionError, InteractionSession};
use crate::domain::outcome::{DivergenceRule, OutcomeResolver};
use crate::domain::reveal::RevealTimeline;

/// Storage key names an experiment persists under (before namespacing).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceKeys {
    /// Aggregate stats blob.
    pub stats: Option<String>,
    /// Capped completion counter.
    pub counter: Option<String>,
    /// Last resolved option key.
    pub last_outcome: Option<String>,
}

/// Configuration data for one experiment.
///
/// The engine has no per-experiment code paths; presets differ only in
/// the values held here.
#[derive(Clone)]
pub struct ExperimentDefinition {
    id: ExperimentId,
    title: String,
    domain: ChoiceDomain,
    step_count: usize,
    divergence: DivergenceProbability,
    divergence_rule: DivergenceRule,
    classifier: Arc<dyn Classifier>,
    reveal: RevealTimeline,
    alternate_reveal: RevealTimeline,
    scan_order: ScanOrder,
    fallback: FallbackFlip,
    keys: PersistenceKeys,
}

impl ExperimentDefinition {
    /// Creates a definition with no divergence, no reveal stages and no
    /// persistence.
    pub fn new(
        id: ExperimentId,
        title: impl Into<String>,
        domain: ChoiceDomain,
        step_count: usize,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, InteractionError> {
        if step_count == 0 {
            return Err(ValidationError::out_of_range("step_count", 1, i32::MAX, 0).into());
        }
        Ok(Self {
            id,
            title: title.into(),
            domain,
            step_count,
            divergence: DivergenceProbability::NEVER,
            divergence_rule: DivergenceRule::default(),
            classifier,
            reveal: RevealTimeline::empty(),
            alternate_reveal: RevealTimeline::empty(),
            scan_order: ScanOrder::default(),
            fallback: FallbackFlip::default(),
            keys: PersistenceKeys::default(),
        })
    }

    pub fn with_divergence(mut self, p: DivergenceProbability, rule: DivergenceRule) -> Self {
        self.divergence = p;
        self.divergence_rule = rule;
        self
    }

    pub fn with_reveal(mut self, timeline: RevealTimeline) -> Self {
        self.reveal = timeline;
        self
    }

    pub fn with_alternate_reveal(mut self, timeline: RevealTimeline) -> Self {
        self.alternate_reveal = timeline;
        self
    }

    pub fn with_exploration(mut self, scan_order: ScanOrder, fallback: FallbackFlip) -> Self {
        self.scan_order = scan_order;
        self.fallback = fallback;
        self
    }

    pub fn with_keys(mut self, keys: PersistenceKeys) -> Self {
        self.keys = keys;
        self
    }

    // Accessors

    pub fn id(&self) -> &ExperimentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn domain(&self) -> &ChoiceDomain {
        &self.domain
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn divergence(&self) -> DivergenceProbability {
        self.divergence
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn reveal(&self) -> &RevealTimeline {
        &self.reveal
    }

    pub fn alternate_reveal(&self) -> &RevealTimeline {
        &self.alternate_reveal
    }

    pub fn keys(&self) -> &PersistenceKeys {
        &self.keys
    }

    // Component factories

    pub fn resolver(&self) -> OutcomeResolver {
        OutcomeResolver::new(self.domain.clone(), self.divergence).with_rule(self.divergence_rule)
    }

    /// Explorer sharing this experiment's classifier instance.
    pub fn explorer(&self) -> AlternateOutcomeExplorer {
        AlternateOutcomeExplorer::new(self.domain.clone(), Arc::clone(&self.classifier))
            .with_scan_order(self.scan_order.clone())
            .with_fallback(self.fallback.clone())
    }

    pub fn new_session(&self) -> Result<InteractionSession, InteractionError> {
        InteractionSession::new(self.id.clone(), self.domain.clone(), self.step_count)
    }
}

impl fmt::Debug for ExperimentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("domain", &self.domain)
            .field("step_count", &self.step_count)
            .field("divergence", &self.divergence)
            .field("reveal", &self.reveal)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interaction::{ChoiceSequence, Classification, LabelCatalog};

    struct Fixed(LabelCatalog);

    impl Classifier for Fixed {
        fn catalog(&self) -> &LabelCatalog {
            &self.0
        }

        fn classify(&self, _sequence: &ChoiceSequence) -> Classification {
            Classification::new(self.0.labels()[0].clone())
        }
    }

    fn classifier() -> Arc<dyn Classifier> {
        Arc::new(Fixed(LabelCatalog::new(["only"]).unwrap()))
    }

    #[test]
    fn zero_steps_rejected() {
        let result = ExperimentDefinition::new(
            ExperimentId::new("x").unwrap(),
            "X",
            ChoiceDomain::binary("a", "b").unwrap(),
            0,
            classifier(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn defaults_never_diverge_and_reveal_nothing() {
        let def = ExperimentDefinition::new(
            ExperimentId::new("x").unwrap(),
            "X",
            ChoiceDomain::binary("a", "b").unwrap(),
            2,
            classifier(),
        )
        .unwrap();

        assert_eq!(def.divergence(), DivergenceProbability::NEVER);
        assert!(def.reveal().is_empty());
        assert_eq!(def.keys(), &PersistenceKeys::default());

        let session = def.new_session().unwrap();
        assert_eq!(session.step_count(), 2);
        assert_eq!(session.experiment(), def.id());
    }
}
