//! Probability value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Fixed chance that a resolved outcome differs from the requested one.
///
/// Always finite and within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DivergenceProbability(f64);

impl DivergenceProbability {
    /// The outcome always matches the request.
    pub const NEVER: Self = Self(0.0);

    /// The outcome never matches the request (when an alternate exists).
    pub const ALWAYS: Self = Self(1.0);

    /// Creates a probability, rejecting NaN and values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::invalid_format(
                "divergence_probability",
                format!("expected a value in [0, 1], got {}", value),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw probability.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for DivergenceProbability {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DivergenceProbability> for f64 {
    fn from(p: DivergenceProbability) -> Self {
        p.0
    }
}

impl fmt::Display for DivergenceProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// A uniform random draw in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct UnitDraw(f64);

impl UnitDraw {
    /// Creates a draw, rejecting values outside `[0, 1)`.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..1.0).contains(&value) {
            return Err(ValidationError::invalid_format(
                "unit_draw",
                format!("expected a value in [0, 1), got {}", value),
            ));
        }
        Ok(Self(value))
    }

    /// Folds any float into `[0, 1)`; NaN becomes 0.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else if value >= 1.0 {
            Self(1.0 - f64::EPSILON)
        } else {
            Self(value)
        }
    }

    /// Returns the raw draw.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Maps the draw onto an index in `0..len`.
    ///
    /// `len` must be non-zero.
    pub fn pick_index(&self, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index on an empty range");
        ((self.0 * len as f64) as usize).min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divergence_probability_accepts_bounds() {
        assert!(DivergenceProbability::new(0.0).is_ok());
        assert!(DivergenceProbability::new(0.8).is_ok());
        assert!(DivergenceProbability::new(1.0).is_ok());
    }

    #[test]
    fn divergence_probability_rejects_out_of_range() {
        assert!(DivergenceProbability::new(-0.1).is_err());
        assert!(DivergenceProbability::new(1.01).is_err());
        assert!(DivergenceProbability::new(f64::NAN).is_err());
    }

    #[test]
    fn divergence_probability_deserializes_with_validation() {
        let p: DivergenceProbability = serde_json::from_str("0.8").unwrap();
        assert!((p.value() - 0.8).abs() < f64::EPSILON);
        assert!(serde_json::from_str::<DivergenceProbability>("2.0").is_err());
    }

    #[test]
    fn unit_draw_rejects_one() {
        assert!(UnitDraw::new(0.999).is_ok());
        assert!(UnitDraw::new(1.0).is_err());
    }

    #[test]
    fn unit_draw_saturating_folds_into_range() {
        assert_eq!(UnitDraw::saturating(-3.0).value(), 0.0);
        assert!(UnitDraw::saturating(7.0).value() < 1.0);
        assert_eq!(UnitDraw::saturating(f64::NAN).value(), 0.0);
    }

    #[test]
    fn unit_draw_pick_index_stays_in_range() {
        assert_eq!(UnitDraw::new(0.0).unwrap().pick_index(3), 0);
        assert_eq!(UnitDraw::new(0.5).unwrap().pick_index(3), 1);
        assert_eq!(UnitDraw::saturating(1.0).pick_index(3), 2);
    }
}
