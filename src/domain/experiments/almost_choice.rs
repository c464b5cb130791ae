//! "The Almost Choice" - two options, one outcome, usually the other one.

use std::sync::Arc;

use crate::domain::foundation::{DivergenceProbability, ExperimentId};
use crate::domain::interaction::{
    ChoiceDomain, ChoiceSequence, Classification, Classifier, InteractionError, LabelCatalog,
};
use crate::domain::outcome::DivergenceRule;
use crate::domain::reveal::RevealTimeline;

use super::{ExperimentDefinition, PersistenceKeys};

pub const SLUG: &str = "almost-choice";
pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";

/// Chance that the visitor gets the option they did not pick.
pub const FLIP_PROBABILITY: f64 = 0.8;

/// Delay before the outcome shows ("did I misclick?").
pub const OUTCOME_DELAY_MS: u64 = 210;

/// Delay before the quiet hint shows, from the trigger.
pub const HINT_DELAY_MS: u64 = OUTCOME_DELAY_MS + 2_500;

pub const STAGE_OUTCOME: &str = "outcome";
pub const STAGE_HINT: &str = "hint";

/// Labels a session by the option that actually happened.
#[derive(Debug, Clone)]
pub struct FinalOptionClassifier {
    catalog: LabelCatalog,
}

impl FinalOptionClassifier {
    /// One label per option key, in domain order.
    pub fn new(domain: &ChoiceDomain) -> Result<Self, InteractionError> {
        Ok(Self {
            catalog: LabelCatalog::new(domain.keys())?,
        })
    }
}

impl Classifier for FinalOptionClassifier {
    fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    fn classify(&self, sequence: &ChoiceSequence) -> Classification {
        let labels = self.catalog.labels();
        let index = sequence
            .last()
            .map(|c| c.option.value())
            .unwrap_or(0)
            .min(labels.len().saturating_sub(1));
        Classification::new(labels[index].clone())
    }
}

/// Builds the preset.
pub fn definition() -> Result<ExperimentDefinition, InteractionError> {
    let domain = ChoiceDomain::binary(LEFT, RIGHT)?;
    let classifier = Arc::new(FinalOptionClassifier::new(&domain)?);

    Ok(ExperimentDefinition::new(
        ExperimentId::new(SLUG)?,
        "The Almost Choice",
        domain,
        1,
        classifier,
    )?
    .with_divergence(
        DivergenceProbability::new(FLIP_PROBABILITY)?,
        DivergenceRule::Alternate,
    )
    .with_reveal(RevealTimeline::from_millis([
        (OUTCOME_DELAY_MS, STAGE_OUTCOME),
        (HINT_DELAY_MS, STAGE_HINT),
    ])?)
    .with_keys(PersistenceKeys {
        stats: None,
        counter: Some("almostChoiceCount".to_string()),
        last_outcome: Some("lastAlmostChoice".to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interaction::OptionIndex;

    #[test]
    fn preset_is_single_step_binary() {
        let def = definition().unwrap();
        assert_eq!(def.id().as_str(), SLUG);
        assert_eq!(def.step_count(), 1);
        assert!(def.domain().is_binary());
        assert_eq!(def.divergence().value(), 0.8);
        assert_eq!(def.reveal().len(), 2);
    }

    #[test]
    fn classifier_labels_final_option() {
        let domain = ChoiceDomain::binary(LEFT, RIGHT).unwrap();
        let classifier = FinalOptionClassifier::new(&domain).unwrap();

        let mut seq = ChoiceSequence::new();
        seq.push(OptionIndex::new(1));

        assert_eq!(classifier.classify(&seq).label.as_str(), RIGHT);
    }
}
