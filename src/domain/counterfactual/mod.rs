//! Counterfactual module - alternate outcomes from single-choice flips.
//!
//! Pure and stateless: takes a finished sequence, returns recomputed results,
//! never touches the session it came from.

mod explorer;

pub use explorer::{AlternateOutcome, AlternateOutcomeExplorer, FallbackFlip, ScanOrder};
