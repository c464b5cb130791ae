//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! experiment sessions, timed reveal, and persisted per-client stats.

pub mod handlers;

pub use handlers::{
    // Experiment handlers
    Completion, ExperimentRunner, RevealDriver, SubmitOutcome,
    // Stats handlers
    CappedCounter, DerivedStatsStore, VariantAssigner,
};
