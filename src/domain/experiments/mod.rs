//! Experiments module - presets and the catalogue.
//!
//! An experiment is configuration data (`ExperimentDefinition`) fed to the
//! shared engine. Three presets ship with the crate:
//!
//! - `almost_choice` - binary, single step, 80% divergence
//! - `choice_engine` - fifteen binary questions scored into personality types
//! - `you_are_not_special` - seven multi-option questions, staged reveal,
//!   persisted A/B bucket

pub mod almost_choice;
mod catalog;
pub mod choice_engine;
mod definition;
pub mod you_are_not_special;

pub use catalog::{Badge, CatalogEntry, ExperimentCatalog};
pub use definition::{ExperimentDefinition, PersistenceKeys};

use crate::domain::interaction::InteractionError;

/// Builds the preset registered under `slug`, if any.
pub fn preset(slug: &str) -> Option<Result<ExperimentDefinition, InteractionError>> {
    match slug {
        almost_choice::SLUG => Some(almost_choice::definition()),
        choice_engine::SLUG => Some(choice_engine::definition()),
        you_are_not_special::SLUG => Some(you_are_not_special::definition()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_by_slug() {
        assert!(preset("almost-choice").unwrap().is_ok());
        assert!(preset("choice-engine").unwrap().is_ok());
        assert!(preset("you-are-not-special").unwrap().is_ok());
        assert!(preset("the-waiting-game").is_none());
    }
}
