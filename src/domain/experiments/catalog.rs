//! Experiment catalogue and "try another experiment" navigation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ExperimentId, ValidationError};
use crate::ports::RandomSource;

/// Badge shown on a catalogue card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Badge {
    Active,
    New,
    Rare,
}

/// One catalogue card. Placeholders have no id and are always disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Option<ExperimentId>,
    pub title: String,
    pub subtitle: String,
    pub badge: Option<Badge>,
    #[serde(default)]
    pub disabled: bool,
}

impl CatalogEntry {
    pub fn experiment(
        slug: &str,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        badge: Option<Badge>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Some(ExperimentId::new(slug)?),
            title: title.into(),
            subtitle: subtitle.into(),
            badge,
            disabled: false,
        })
    }

    pub fn placeholder(subtitle: impl Into<String>) -> Self {
        Self {
            id: None,
            title: "Coming soon".to_string(),
            subtitle: subtitle.into(),
            badge: None,
            disabled: true,
        }
    }

    /// Linked and not disabled.
    pub fn is_active(&self) -> bool {
        self.id.is_some() && !self.disabled
    }
}

/// Ordered list of experiments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExperimentCatalog {
    entries: Vec<CatalogEntry>,
}

const SITE: &[(&str, &str, &str, Badge)] = &[
    ("almost-button", "The Almost Button", "It will never do what you expect.", Badge::New),
    ("choice-engine", "The Choice Engine", "Every choice changes who you are.", Badge::Active),
    ("almost-choice", "The Almost Choice", "You were very close.", Badge::New),
    ("how-manipulable-are-you", "How Manipulable Are You?", "Can you resist the interface?", Badge::New),
    ("you-are-not-special", "You Are Not Special", "A short experiment about uniqueness.", Badge::New),
    ("the-waiting-game", "The Waiting Game", "It won't reward you.", Badge::New),
    (
        "the-richest-person-alive",
        "The Richest Person Alive",
        "For a moment, you have more money than anyone who has ever lived.",
        Badge::New,
    ),
];

const PLACEHOLDERS: &[&str] = &[
    "A new experiment is forming.",
    "We are still calibrating it.",
    "It is not ready to be seen.",
];

impl ExperimentCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The site's catalogue, placeholders included.
    pub fn site() -> Result<Self, ValidationError> {
        let mut entries = SITE
            .iter()
            .map(|(slug, title, subtitle, badge)| {
                CatalogEntry::experiment(slug, *title, *subtitle, Some(*badge))
            })
            .collect::<Result<Vec<_>, _>>()?;
        entries.extend(PLACEHOLDERS.iter().map(|s| CatalogEntry::placeholder(*s)));
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn active(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_active())
    }

    pub fn find(&self, id: &ExperimentId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id.as_ref() == Some(id))
    }

    /// Uniform pick among active experiments other than `current`.
    ///
    /// `None` when `current` is the only active experiment.
    pub fn pick_another(
        &self,
        current: &ExperimentId,
        rng: &mut dyn RandomSource,
    ) -> Option<&CatalogEntry> {
        let pool: Vec<&CatalogEntry> = self
            .active()
            .filter(|e| e.id.as_ref() != Some(current))
            .collect();
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.pick_index(pool.len())])
    }
}
