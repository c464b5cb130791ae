//! Capped long-lived counter value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound for per-client counters.
pub const DEFAULT_COUNTER_CAP: u32 = 9999;

/// Highest mood level derived from a counter.
pub const MAX_MOOD_LEVEL: u8 = 3;

/// A non-negative count that never exceeds its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CappedCount(u32);

impl CappedCount {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// The next count, saturating at `cap`.
    pub fn bumped(self, cap: u32) -> Self {
        Self(self.0.saturating_add(1).min(cap))
    }

    /// Mood level `0..=3`: one step per two counts.
    pub fn mood_level(&self) -> u8 {
        (self.0 / 2).min(u32::from(MAX_MOOD_LEVEL)) as u8
    }

    /// Reads a stored value leniently.
    ///
    /// Accepts a JSON number or a numeric string; anything else (negative,
    /// fractional junk, garbage) counts as zero.
    pub fn from_stored(value: &Value) -> Self {
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .map(|v| Self(v.min(u64::from(u32::MAX)) as u32))
            .unwrap_or(Self::ZERO)
    }
}
