//! Domain layer containing the interaction engine's rules and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `interaction` - Choice domains, sessions and the classifier seam
//! - `outcome` - Randomized resolution of requested choices
//! - `reveal` - Timed, cancellable staged disclosure
//! - `counterfactual` - Single-flip alternate outcomes
//! - `stats` - Aggregate counts and capped counters
//! - `experiments` - Preset definitions and the catalogue

pub mod counterfactual;
pub mod experiments;
pub mod foundation;
pub mod interaction;
pub mod outcome;
pub mod reveal;
pub mod stats;
