//! Interaction module - choices, sessions and outcome classification.
//!
//! # Components
//!
//! - `ChoiceDomain` / `ChoiceSequence` - finite option sets and recorded picks
//! - `Classifier` - the pure scoring seam shared by real and counterfactual results
//! - `InteractionSession` - one run through an experiment, driven by `Phase`

mod choice;
mod classification;
mod errors;
mod phase;
mod session;

pub use choice::{Choice, ChoiceDomain, ChoiceSequence, OptionIndex};
pub use classification::{Classification, Classifier, LabelCatalog, OutcomeLabel};
pub use errors::InteractionError;
pub use phase::Phase;
pub use session::InteractionSession;
