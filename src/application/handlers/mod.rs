//! Application handlers.
//!
//! Handlers that orchestrate domain operations over the ports.

pub mod experiment;
pub mod stats;

pub use experiment::{Completion, ExperimentRunner, RevealDriver, SubmitOutcome};
pub use stats::{CappedCounter, DerivedStatsStore, VariantAssigner};
