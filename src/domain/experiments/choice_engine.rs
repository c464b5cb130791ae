//! "The Choice Engine" - fifteen moral dilemmas, one personality type.
//!
//! Each answer adds fixed trait points. Totals are normalised to whole
//! percentages and matched against the personality catalogue in order; the
//! first type whose every criterion is met wins, the last type is the
//! fallback.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::counterfactual::{FallbackFlip, ScanOrder};
use crate::domain::foundation::{DivergenceProbability, ExperimentId, Percentage};
use crate::domain::interaction::{
    ChoiceDomain, ChoiceSequence, Classification, Classifier, InteractionError, LabelCatalog,
    OptionIndex,
};
use crate::domain::outcome::DivergenceRule;
use crate::domain::reveal::RevealTimeline;

use super::{ExperimentDefinition, PersistenceKeys};

pub const SLUG: &str = "choice-engine";
pub const OPTION_A: &str = "A";
pub const OPTION_B: &str = "B";

pub const TEASER_DELAY_MS: u64 = 3_500;
pub const ALTERNATE_DELAY_MS: u64 = 900;
pub const STAGE_TEASER: &str = "different-teaser";
pub const STAGE_ALTERNATE: &str = "alternate";

/// One-based question numbers checked, in order, for the "most questionable"
/// answer.
pub const QUESTIONABLE_QUESTIONS: [usize; 5] = [8, 4, 12, 15, 6];

/// Reported when none of the questionable questions was answered A.
pub const DEFAULT_QUESTIONABLE: usize = 8;

/// Scored personality axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Empathy,
    Utilitarianism,
    Ego,
    Chaos,
}

impl Trait {
    pub const ALL: [Trait; 4] = [
        Trait::Empathy,
        Trait::Utilitarianism,
        Trait::Ego,
        Trait::Chaos,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Trait::Empathy => "empathy",
            Trait::Utilitarianism => "utilitarianism",
            Trait::Ego => "ego",
            Trait::Chaos => "chaos",
        }
    }
}

/// Trait points, raw or normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraitScores {
    pub empathy: u32,
    pub utilitarianism: u32,
    pub ego: u32,
    pub chaos: u32,
}

impl TraitScores {
    pub const fn new(empathy: u32, utilitarianism: u32, ego: u32, chaos: u32) -> Self {
        Self {
            empathy,
            utilitarianism,
            ego,
            chaos,
        }
    }

    pub fn get(&self, t: Trait) -> u32 {
        match t {
            Trait::Empathy => self.empathy,
            Trait::Utilitarianism => self.utilitarianism,
            Trait::Ego => self.ego,
            Trait::Chaos => self.chaos,
        }
    }

    pub fn total(&self) -> u32 {
        self.empathy + self.utilitarianism + self.ego + self.chaos
    }

    fn add(&mut self, other: &TraitScores) {
        self.empathy += other.empathy;
        self.utilitarianism += other.utilitarianism;
        self.ego += other.ego;
        self.chaos += other.chaos;
    }

    /// Each trait's rounded share of the total. All zero when nothing scored.
    pub fn normalized(&self) -> TraitScores {
        let total = u64::from(self.total().max(1));
        let share = |v: u32| {
            Percentage::of_ratio(u64::from(v), total)
                .map(|p| u32::from(p.value()))
                .unwrap_or(0)
        };
        TraitScores {
            empathy: share(self.empathy),
            utilitarianism: share(self.utilitarianism),
            ego: share(self.ego),
            chaos: share(self.chaos),
        }
    }
}

/// A binary dilemma and the points each answer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub number: usize,
    pub text: &'static str,
    pub option_a: &'static str,
    pub option_b: &'static str,
    pub points_a: TraitScores,
    pub points_b: TraitScores,
}

impl Question {
    pub fn points(&self, option: OptionIndex) -> &TraitScores {
        if option.value() == 0 {
            &self.points_a
        } else {
            &self.points_b
        }
    }
}

/// A personality type and its minimum normalised trait shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonalityType {
    pub name: &'static str,
    pub criteria: &'static [(Trait, u32)],
    pub description: &'static str,
}

impl PersonalityType {
    pub fn matches(&self, normalized: &TraitScores) -> bool {
        self.criteria
            .iter()
            .all(|(t, min)| normalized.get(*t) >= *min)
    }
}

const fn pts(empathy: u32, utilitarianism: u32, ego: u32, chaos: u32) -> TraitScores {
    TraitScores::new(empathy, utilitarianism, ego, chaos)
}

pub static QUESTIONS: [Question; 15] = [
    Question {
        number: 1,
        text: "You find a wallet with $500 and an ID. No one is watching.",
        option_a: "Return it immediately",
        option_b: "Keep the cash, mail back the wallet",
        points_a: pts(10, 5, 0, 0),
        points_b: pts(0, 0, 10, 5),
    },
    Question {
        number: 2,
        text: "A trolley is heading toward five people. You can divert it to kill one person instead.",
        option_a: "Pull the lever",
        option_b: "Do nothing",
        points_a: pts(0, 15, 0, 0),
        points_b: pts(10, 0, 0, 5),
    },
    Question {
        number: 3,
        text: "Your best friend asks if they look good. They don't.",
        option_a: "Tell them the truth",
        option_b: "Lie to protect their feelings",
        points_a: pts(0, 0, 5, 5),
        points_b: pts(10, 5, 0, 0),
    },
    Question {
        number: 4,
        text: "You can take credit for your colleague's idea and get promoted.",
        option_a: "Take the credit",
        option_b: "Give them credit",
        points_a: pts(0, 0, 15, 5),
        points_b: pts(15, 5, 0, 0),
    },
    Question {
        number: 5,
        text: "You discover your company is polluting illegally. Exposing it means you lose your job.",
        option_a: "Stay silent",
        option_b: "Expose them",
        points_a: pts(0, 5, 10, 0),
        points_b: pts(10, 0, 0, 10),
    },
    Question {
        number: 6,
        text: "You can live comfortably while 100 strangers suffer, or struggle while they thrive.",
        option_a: "Choose comfort",
        option_b: "Choose their wellbeing",
        points_a: pts(0, 0, 15, 0),
        points_b: pts(15, 10, 0, 0),
    },
    Question {
        number: 7,
        text: "A genie offers: know every truth about your life, or stay blissfully ignorant.",
        option_a: "Know everything",
        option_b: "Stay ignorant",
        points_a: pts(0, 0, 5, 10),
        points_b: pts(0, 10, 0, 0),
    },
    Question {
        number: 8,
        text: "You can save your pet or a stranger's child. Only one.",
        option_a: "Save your pet",
        option_b: "Save the child",
        points_a: pts(0, 0, 20, 0),
        points_b: pts(15, 15, 0, 0),
    },
    Question {
        number: 9,
        text: "You inherit $10 million, but accepting it means a random person goes bankrupt.",
        option_a: "Accept the money",
        option_b: "Refuse it",
        points_a: pts(0, 5, 10, 0),
        points_b: pts(15, 0, 0, 0),
    },
    Question {
        number: 10,
        text: "You can erase your most painful memory, but you'll forget the lesson it taught you.",
        option_a: "Erase it",
        option_b: "Keep the pain",
        points_a: pts(0, 0, 10, 0),
        points_b: pts(5, 10, 0, 0),
    },
    Question {
        number: 11,
        text: "You witness a crime. Testifying destroys the criminal's family, but brings justice.",
        option_a: "Testify",
        option_b: "Stay silent",
        points_a: pts(0, 10, 0, 5),
        points_b: pts(10, 0, 0, 0),
    },
    Question {
        number: 12,
        text: "Everyone must follow your moral code, or everyone follows their own. Choose.",
        option_a: "Everyone follows mine",
        option_b: "Everyone follows their own",
        points_a: pts(0, 10, 15, 0),
        points_b: pts(5, 0, 0, 15),
    },
    Question {
        number: 13,
        text: "You can prevent a tragedy, but you'll be blamed for it forever.",
        option_a: "Prevent it anyway",
        option_b: "Let it happen",
        points_a: pts(15, 10, 0, 0),
        points_b: pts(0, 0, 15, 0),
    },
    Question {
        number: 14,
        text: "A dying billionaire offers you their fortune to lie at their funeral about who they were.",
        option_a: "Take it and lie",
        option_b: "Refuse",
        points_a: pts(0, 5, 10, 0),
        points_b: pts(10, 0, 0, 5),
    },
    Question {
        number: 15,
        text: "You can rewrite one decision in your past, but someone else suffers the consequence instead.",
        option_a: "Rewrite it",
        option_b: "Leave it unchanged",
        points_a: pts(0, 0, 20, 0),
        points_b: pts(20, 0, 0, 0),
    },
];

pub static PERSONALITY_TYPES: [PersonalityType; 6] = [
    PersonalityType {
        name: "The Ruthless Optimizer",
        criteria: &[(Trait::Utilitarianism, 30), (Trait::Ego, 20)],
        description: "You calculate outcomes like a machine. Emotions are bugs in your system. You've convinced yourself this makes you rational, not cruel.",
    },
    PersonalityType {
        name: "The Comfortable Egotist",
        criteria: &[(Trait::Ego, 35)],
        description: "You've mastered the art of justifying self-interest. Your moral compass points directly at you. At least you're honest about it.",
    },
    PersonalityType {
        name: "The Guilty Empath",
        criteria: &[(Trait::Empathy, 35)],
        description: "You'd sacrifice yourself for strangers, then wonder why you feel empty. Your kindness borders on self-destruction. Martyrdom suits you.",
    },
    PersonalityType {
        name: "The Chaos Philosopher",
        criteria: &[(Trait::Chaos, 30)],
        description: "You choose the unpredictable because predictability terrifies you. Order feels like a cage. Your life is a controlled burn.",
    },
    PersonalityType {
        name: "The Pragmatic Survivor",
        criteria: &[(Trait::Ego, 25), (Trait::Utilitarianism, 25)],
        description: "You balance selfishness with logic. You help others when it's convenient. You sleep fine at night because you've lowered your expectations.",
    },
    PersonalityType {
        name: "The Conflicted Idealist",
        criteria: &[(Trait::Empathy, 25), (Trait::Chaos, 20)],
        description: "You want to do good but keep making exceptions. Your morality is a rough draft. You're still editing.",
    },
];

static TYPE_INDEX: Lazy<std::collections::HashMap<&'static str, &'static PersonalityType>> =
    Lazy::new(|| PERSONALITY_TYPES.iter().map(|t| (t.name, t)).collect());

/// Looks up a personality type by name.
pub fn personality(name: &str) -> Option<&'static PersonalityType> {
    TYPE_INDEX.get(name).copied()
}

/// Everything derived from one answer sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceEngineResult {
    pub traits: TraitScores,
    pub personality: &'static PersonalityType,
    /// One-based question number.
    pub most_questionable: usize,
    pub secret_ending: bool,
}

/// Scores a (possibly partial) answer sequence.
///
/// Answers beyond the question bank are ignored.
pub fn evaluate(answers: &ChoiceSequence) -> ChoiceEngineResult {
    let mut raw = TraitScores::default();
    for (question, option) in QUESTIONS.iter().zip(answers.options()) {
        raw.add(question.points(*option));
    }
    let traits = raw.normalized();

    let fallback = &PERSONALITY_TYPES[PERSONALITY_TYPES.len() - 1];
    let personality = PERSONALITY_TYPES
        .iter()
        .find(|t| t.matches(&traits))
        .unwrap_or(fallback);

    ChoiceEngineResult {
        traits,
        personality,
        most_questionable: most_questionable(answers),
        secret_ending: secret_ending(&traits, answers),
    }
}

fn answered(answers: &ChoiceSequence, question: usize, option: usize) -> bool {
    answers
        .get(question - 1)
        .map_or(false, |o| o.value() == option)
}

/// First questionable question answered A, else question 8.
pub fn most_questionable(answers: &ChoiceSequence) -> usize {
    QUESTIONABLE_QUESTIONS
        .iter()
        .copied()
        .find(|&q| answered(answers, q, 0))
        .unwrap_or(DEFAULT_QUESTIONABLE)
}

/// Rare profile (high chaos and ego, low empathy) or the Q2=B, Q5=A,
/// Q8=B, Q11=A answer pattern.
pub fn secret_ending(traits: &TraitScores, answers: &ChoiceSequence) -> bool {
    let rare_profile = traits.chaos >= 42 && traits.ego >= 34 && traits.empathy <= 18;
    let pattern = answered(answers, 2, 1)
        && answered(answers, 5, 0)
        && answered(answers, 8, 1)
        && answered(answers, 11, 0);
    rare_profile || pattern
}

/// `Classifier` over the question bank.
///
/// Scores carry the normalised trait shares plus `secret` (0 or 1) and
/// `most_questionable` (question number).
#[derive(Debug, Clone)]
pub struct ChoiceEngineClassifier {
    catalog: LabelCatalog,
}

impl ChoiceEngineClassifier {
    pub fn new() -> Result<Self, InteractionError> {
        Ok(Self {
            catalog: LabelCatalog::new(PERSONALITY_TYPES.iter().map(|t| t.name))?,
        })
    }
}

impl Classifier for ChoiceEngineClassifier {
    fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    fn classify(&self, sequence: &ChoiceSequence) -> Classification {
        let result = evaluate(sequence);
        let labels = self.catalog.labels();
        let index = PERSONALITY_TYPES
            .iter()
            .position(|t| t.name == result.personality.name)
            .unwrap_or(labels.len() - 1);

        let mut classification = Classification::new(labels[index].clone());
        for t in Trait::ALL {
            classification = classification.with_score(t.name(), result.traits.get(t).min(100) as u8);
        }
        classification
            .with_score("secret", u8::from(result.secret_ending))
            .with_score("most_questionable", result.most_questionable as u8)
    }
}

/// Builds the preset.
pub fn definition() -> Result<ExperimentDefinition, InteractionError> {
    let domain = ChoiceDomain::binary(OPTION_A, OPTION_B)?;
    let option_a = domain.index_of(OPTION_A)?;

    Ok(ExperimentDefinition::new(
        ExperimentId::new(SLUG)?,
        "The Choice Engine",
        domain,
        QUESTIONS.len(),
        Arc::new(ChoiceEngineClassifier::new()?),
    )?
    .with_divergence(DivergenceProbability::NEVER, DivergenceRule::Alternate)
    .with_reveal(RevealTimeline::from_millis([(TEASER_DELAY_MS, STAGE_TEASER)])?)
    .with_alternate_reveal(RevealTimeline::from_millis([(
        ALTERNATE_DELAY_MS,
        STAGE_ALTERNATE,
    )])?)
    .with_exploration(
        ScanOrder::Ascending,
        FallbackFlip::FirstWithOption {
            candidates: QUESTIONABLE_QUESTIONS.iter().map(|q| q - 1).collect(),
            option: option_a,
            default: DEFAULT_QUESTIONABLE - 1,
        },
    )
    .with_keys(PersistenceKeys {
        stats: Some("ce_stats_v1".to_string()),
        counter: None,
        last_outcome: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pattern: &str) -> ChoiceSequence {
        let domain = ChoiceDomain::binary(OPTION_A, OPTION_B).unwrap();
        let keys: Vec<String> = pattern.chars().map(|c| c.to_string()).collect();
        ChoiceSequence::from_keys(&domain, keys.iter().map(|s| s.as_str())).unwrap()
    }

    #[test]
    fn question_bank_shape() {
        assert_eq!(QUESTIONS.len(), 15);
        for (i, q) in QUESTIONS.iter().enumerate() {
            assert_eq!(q.number, i + 1);
            assert!(q.points_a.total() > 0);
            assert!(q.points_b.total() > 0);
        }
    }

    #[test]
    fn all_b_is_guilty_empath() {
        let result = evaluate(&answers("BBBBBBBBBBBBBBB"));
        assert_eq!(result.personality.name, "The Guilty Empath");
        assert!(result.traits.empathy >= 35);
        assert_eq!(result.most_questionable, 8);
    }

    #[test]
    fn all_a_is_comfortable_egotist() {
        // A answers: ego 135, utilitarianism 65, empathy 25, chaos 25
        let result = evaluate(&answers("AAAAAAAAAAAAAAA"));
        assert_eq!(result.traits.ego, 54);
        assert_eq!(result.traits.utilitarianism, 26);
        assert_eq!(result.personality.name, "The Comfortable Egotist");
        assert_eq!(result.most_questionable, 8);
    }

    #[test]
    fn most_questionable_follows_priority_order() {
        // Q8 = B, Q4 = A
        assert_eq!(most_questionable(&answers("BBBABBBBBBBBBBB")), 4);
        // Only Q6 = A
        assert_eq!(most_questionable(&answers("BBBBBABBBBBBBBB")), 6);
    }

    #[test]
    fn normalized_shares_of_nothing_are_zero() {
        assert_eq!(TraitScores::default().normalized(), TraitScores::default());
    }

    #[test]
    fn empty_sequence_falls_back_to_last_type() {
        let result = evaluate(&ChoiceSequence::new());
        assert_eq!(result.personality.name, "The Conflicted Idealist");
    }

    #[test]
    fn pattern_triggers_secret_ending() {
        let result = evaluate(&answers("ABBBABBBBBABBBB"));
        assert!(result.secret_ending);
    }

    #[test]
    fn classifier_exposes_scores() {
        let classifier = ChoiceEngineClassifier::new().unwrap();
        let c = classifier.classify(&answers("BBBBBBBBBBBBBBB"));

        assert_eq!(c.label.as_str(), "The Guilty Empath");
        assert_eq!(c.scores.get("most_questionable"), Some(&8));
        assert!(c.scores.contains_key("empathy"));
        assert!(classifier.catalog().contains(&c.label));
    }

    #[test]
    fn personality_lookup() {
        assert!(personality("The Chaos Philosopher").is_some());
        assert!(personality("Nobody").is_none());
    }

    #[test]
    fn preset_wiring() {
        let def = definition().unwrap();
        assert_eq!(def.step_count(), 15);
        assert_eq!(def.divergence(), DivergenceProbability::NEVER);
        assert_eq!(def.reveal().stages()[0].delay.as_millis(), 3_500);
        assert_eq!(def.alternate_reveal().stages()[0].delay.as_millis(), 900);
        assert_eq!(def.keys().stats.as_deref(), Some("ce_stats_v1"));
    }
}
