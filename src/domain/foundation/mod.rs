//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the interaction engine.

mod errors;
mod ids;
mod percentage;
mod probability;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{ExperimentId, SessionId};
pub use percentage::Percentage;
pub use probability::{DivergenceProbability, UnitDraw};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
