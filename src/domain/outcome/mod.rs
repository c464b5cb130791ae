//! Outcome module - randomized resolution of requested choices.

mod resolver;

pub use resolver::{DivergenceRule, OutcomeResolver, Resolution};
