//! "You Are Not Special" - seven multi-option questions, one low uniqueness score.
//!
//! Every answer carries a rarity weight. The weight total maps onto a
//! uniqueness percentage between 2 and 12, so the verdict is always the
//! same: you blend in. Questions have between three and five choices; the
//! shared domain is five positional slots and a slot a question does not
//! use weighs 1.

use std::sync::Arc;

use crate::domain::counterfactual::{FallbackFlip, ScanOrder};
use crate::domain::foundation::{DivergenceProbability, ExperimentId, ValidationError};
use crate::domain::interaction::{
    ChoiceDomain, ChoiceSequence, Classification, Classifier, InteractionError, LabelCatalog,
    OptionIndex,
};
use crate::domain::outcome::DivergenceRule;
use crate::domain::reveal::RevealTimeline;
use crate::ports::StorageKey;

use super::ExperimentDefinition;

pub const SLUG: &str = "you-are-not-special";

/// Positional option keys shared by every question.
pub const SLOTS: [&str; 5] = ["a", "b", "c", "d", "e"];

pub const STAGE_HEADLINE: &str = "headline";
pub const STAGE_SIMILARITY: &str = "similarity";
pub const STAGE_CROWD: &str = "crowd";
pub const STAGE_CLOSING: &str = "closing";

pub const SIMILARITY_DELAY_MS: u64 = 900;
pub const CROWD_DELAY_MS: u64 = 1_700;
pub const CLOSING_DELAY_MS: u64 = 2_500;

/// Namespace and name of the persisted A/B bucket.
pub const BUCKET_NAMESPACE: &str = "odd-fun";
pub const BUCKET_NAME: &str = "ab:not-special";
pub const BUCKET_COUNT: usize = 2;

pub const MIN_UNIQUENESS: u8 = 2;
pub const MAX_UNIQUENESS: u8 = 12;

/// Weight of an unanswered question or an unused slot.
const DEFAULT_WEIGHT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerChoice {
    pub id: &'static str,
    pub label: &'static str,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
    pub choices: &'static [AnswerChoice],
    /// Choice given a faint visual emphasis.
    pub nudge: Option<&'static str>,
}

impl Question {
    /// Slot holding the choice `id`.
    pub fn slot_of(&self, id: &str) -> Option<OptionIndex> {
        self.choices.iter().position(|c| c.id == id).map(OptionIndex::new)
    }

    pub fn weight(&self, slot: OptionIndex) -> u32 {
        self.choices
            .get(slot.value())
            .map_or(DEFAULT_WEIGHT, |c| c.weight)
    }
}

const fn choice(id: &'static str, label: &'static str, weight: u32) -> AnswerChoice {
    AnswerChoice { id, label, weight }
}

pub static QUESTIONS: [Question; 7] = [
    Question {
        id: "age",
        title: "How old are you?",
        subtitle: None,
        choices: &[
            choice("u18", "Under 18", 2),
            choice("18_24", "18–24", 1),
            choice("25_34", "25–34", 1),
            choice("35_44", "35–44", 1),
            choice("45p", "45+", 2),
        ],
        nudge: None,
    },
    Question {
        id: "region",
        title: "Where do you live?",
        subtitle: None,
        choices: &[
            choice("eu", "Europe", 1),
            choice("na", "North America", 1),
            choice("asia", "Asia", 1),
            choice("sa", "South America", 2),
            choice("other", "Other", 2),
        ],
        nudge: None,
    },
    Question {
        id: "internet",
        title: "How often do you use the internet?",
        subtitle: None,
        choices: &[
            choice("const", "Almost constantly", 1),
            choice("often", "Often", 1),
            choice("sometimes", "Sometimes", 2),
            choice("rarely", "Rarely", 3),
        ],
        nudge: Some("const"),
    },
    Question {
        id: "music",
        title: "What kind of music do you enjoy?",
        subtitle: None,
        choices: &[
            choice("pop", "Pop", 1),
            choice("hiphop", "Hip-hop", 1),
            choice("rock", "Rock", 1),
            choice("electronic", "Electronic", 1),
            choice("other", "Other", 2),
        ],
        nudge: None,
    },
    Question {
        id: "different",
        title: "Do you think you are different from most people?",
        subtitle: None,
        choices: &[
            choice("yes", "Yes", 0),
            choice("no", "No", 2),
            choice("unsure", "I'm not sure", 1),
        ],
        nudge: Some("yes"),
    },
    Question {
        id: "value",
        title: "Pick one that matters most to you.",
        subtitle: None,
        choices: &[
            choice("freedom", "Freedom", 1),
            choice("comfort", "Comfort", 1),
            choice("success", "Success", 1),
            choice("happiness", "Happiness", 1),
        ],
        nudge: None,
    },
    Question {
        id: "unique",
        title: "Do you consider yourself unique?",
        subtitle: Some("Be honest."),
        choices: &[
            choice("def", "Definitely", 0),
            choice("maybe", "Maybe", 1),
            choice("not", "Not really", 2),
        ],
        nudge: None,
    },
];

/// Slot for choice `id` of question `step` (zero-based).
pub fn answer(step: usize, id: &str) -> Result<OptionIndex, InteractionError> {
    let question = QUESTIONS.get(step).ok_or_else(|| {
        ValidationError::out_of_range("step", 0, QUESTIONS.len() as i32 - 1, step as i32)
    })?;
    question
        .slot_of(id)
        .ok_or_else(|| InteractionError::UnknownOptionKey(id.to_string()))
}

/// Sum of answer weights; missing answers count as the default weight.
pub fn total_weight(answers: &ChoiceSequence) -> u32 {
    QUESTIONS
        .iter()
        .enumerate()
        .map(|(step, q)| answers.get(step).map_or(DEFAULT_WEIGHT, |slot| q.weight(slot)))
        .sum()
}

/// Uniqueness percentage, always within `MIN_UNIQUENESS..=MAX_UNIQUENESS`.
pub fn uniqueness(answers: &ChoiceSequence) -> u8 {
    let w = f64::from(total_weight(answers));
    let scale = QUESTIONS.len() as f64 * 2.2;
    let raw = 2.0 + (w / scale * 10.0).round();
    raw.clamp(f64::from(MIN_UNIQUENESS), f64::from(MAX_UNIQUENESS)) as u8
}

/// "People who answered almost exactly like you today".
///
/// Grows as uniqueness shrinks and drifts slowly with the hour so repeat
/// visits see a live-looking number.
pub fn similar_count(uniqueness: u8, bucket: usize, hours_since_epoch: u64) -> u64 {
    let base = 70_000 + u64::from(MAX_UNIQUENESS.saturating_sub(uniqueness)) * 2_500;
    let drift = hours_since_epoch % 200;
    base + drift * if bucket == 0 { 3 } else { 2 }
}

/// Closing line for an A/B bucket, in light or dark mode.
pub fn variant_line(bucket: usize, dark: bool) -> &'static str {
    match (bucket == 0, dark) {
        (true, false) => "Most of them also thought they were unique.",
        (false, false) => "The good news? You blend in perfectly.",
        (true, true) => "That doesn’t make you rare.",
        (false, true) => "You look exactly like someone online.",
    }
}

/// Persistent-scope key of the A/B bucket.
pub fn bucket_key() -> Result<StorageKey, ValidationError> {
    StorageKey::namespaced(BUCKET_NAMESPACE, BUCKET_NAME)
}

pub fn label_name(uniqueness: u8) -> String {
    format!("uniqueness-{}", uniqueness)
}

/// Labels a session by its uniqueness percentage.
///
/// Scores carry `uniqueness` and `similarity` (its complement).
#[derive(Debug, Clone)]
pub struct UniquenessClassifier {
    catalog: LabelCatalog,
}

impl UniquenessClassifier {
    pub fn new() -> Result<Self, InteractionError> {
        Ok(Self {
            catalog: LabelCatalog::new((MIN_UNIQUENESS..=MAX_UNIQUENESS).map(label_name))?,
        })
    }
}

impl Classifier for UniquenessClassifier {
    fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    fn classify(&self, sequence: &ChoiceSequence) -> Classification {
        let pct = uniqueness(sequence);
        let labels = self.catalog.labels();
        let index = usize::from(pct - MIN_UNIQUENESS).min(labels.len() - 1);

        Classification::new(labels[index].clone())
            .with_score("uniqueness", pct)
            .with_score("similarity", 100 - pct)
    }
}

/// Builds the preset.
pub fn definition() -> Result<ExperimentDefinition, InteractionError> {
    let domain = ChoiceDomain::new(SLOTS)?;

    Ok(ExperimentDefinition::new(
        ExperimentId::new(SLUG)?,
        "You Are Not Special",
        domain,
        QUESTIONS.len(),
        Arc::new(UniquenessClassifier::new()?),
    )?
    .with_divergence(
        DivergenceProbability::NEVER,
        DivergenceRule::UniformAmongOthers,
    )
    .with_reveal(RevealTimeline::from_millis([
        (0, STAGE_HEADLINE),
        (SIMILARITY_DELAY_MS, STAGE_SIMILARITY),
        (CROWD_DELAY_MS, STAGE_CROWD),
        (CLOSING_DELAY_MS, STAGE_CLOSING),
    ])?)
    .with_exploration(ScanOrder::Ascending, FallbackFlip::Last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(ids: &[&str]) -> ChoiceSequence {
        let mut seq = ChoiceSequence::new();
        for (step, id) in ids.iter().enumerate() {
            seq.push(answer(step, id).unwrap());
        }
        seq
    }

    #[test]
    fn preset_has_seven_multi_option_steps_and_four_stages() {
        let def = definition().unwrap();
        assert_eq!(def.id().as_str(), SLUG);
        assert_eq!(def.step_count(), 7);
        assert_eq!(def.domain().len(), 5);
        assert!(!def.domain().is_binary());
        assert_eq!(def.reveal().len(), 4);
        assert_eq!(def.divergence(), DivergenceProbability::NEVER);
    }

    #[test]
    fn every_question_fits_the_slots() {
        for q in &QUESTIONS {
            assert!(q.choices.len() >= 3 && q.choices.len() <= SLOTS.len(), "{}", q.id);
            if let Some(nudge) = q.nudge {
                assert!(q.slot_of(nudge).is_some());
            }
        }
    }

    #[test]
    fn answer_maps_choice_ids_to_slots() {
        assert_eq!(answer(0, "45p").unwrap(), OptionIndex::new(4));
        assert_eq!(answer(4, "unsure").unwrap(), OptionIndex::new(2));
        assert!(matches!(
            answer(4, "maybe"),
            Err(InteractionError::UnknownOptionKey(_))
        ));
        assert!(answer(7, "yes").is_err());
    }

    #[test]
    fn most_common_answers_score_low() {
        // Weights 1,1,1,1,0,1,0 = 5; 2 + round(5 / 15.4 * 10) = 5.
        let seq = answers(&["25_34", "eu", "const", "pop", "yes", "freedom", "def"]);
        assert_eq!(total_weight(&seq), 5);
        assert_eq!(uniqueness(&seq), 5);
    }

    #[test]
    fn rarest_answers_stay_capped() {
        // Weights 2,2,3,2,2,1,2 = 14; 2 + round(9.09) = 11.
        let seq = answers(&["45p", "other", "rarely", "other", "no", "comfort", "not"]);
        assert_eq!(uniqueness(&seq), 11);
        assert!(uniqueness(&seq) <= MAX_UNIQUENESS);
    }

    #[test]
    fn unused_slot_weighs_default() {
        let mut seq = ChoiceSequence::new();
        for _ in 0..7 {
            seq.push(OptionIndex::new(4));
        }
        // Slot "e" on the three- and four-option questions weighs 1.
        assert_eq!(total_weight(&seq), 2 + 2 + 1 + 2 + 1 + 1 + 1);
    }

    #[test]
    fn empty_answers_use_default_weights() {
        assert_eq!(total_weight(&ChoiceSequence::new()), 7);
        assert_eq!(uniqueness(&ChoiceSequence::new()), 7);
    }

    #[test]
    fn classifier_labels_by_uniqueness() {
        let classifier = UniquenessClassifier::new().unwrap();
        let seq = answers(&["25_34", "eu", "const", "pop", "yes", "freedom", "def"]);

        let result = classifier.classify(&seq);
        assert_eq!(result.label.as_str(), "uniqueness-5");
        assert_eq!(result.scores.get("uniqueness"), Some(&5));
        assert_eq!(result.scores.get("similarity"), Some(&95));
        assert!(classifier.catalog().contains(&result.label));
    }

    #[test]
    fn similar_count_grows_as_uniqueness_shrinks() {
        assert_eq!(similar_count(12, 0, 0), 70_000);
        assert_eq!(similar_count(2, 0, 0), 95_000);
        assert_eq!(similar_count(5, 0, 10), 87_500 + 30);
        assert_eq!(similar_count(5, 1, 210), 87_500 + 20);
    }

    #[test]
    fn variant_lines_differ_per_bucket() {
        assert_ne!(variant_line(0, false), variant_line(1, false));
        assert_ne!(variant_line(0, true), variant_line(1, true));
    }

    #[test]
    fn bucket_key_is_namespaced() {
        assert_eq!(bucket_key().unwrap().as_str(), "odd-fun:ab:not-special");
    }
}
