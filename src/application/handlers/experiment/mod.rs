//! Experiment handlers - session orchestration and timed reveal.

mod reveal_driver;
mod runner;

pub use reveal_driver::RevealDriver;
pub use runner::{Completion, ExperimentRunner, SubmitOutcome};
