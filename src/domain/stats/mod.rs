//! Stats module - persisted per-client tallies.
//!
//! Pure value types; reading and writing them lives in the application layer.

mod aggregate;
mod counter;

pub use aggregate::AggregateStats;
pub use counter::{CappedCount, DEFAULT_COUNTER_CAP, MAX_MOOD_LEVEL};
