//! Scripted Random Source for testing.
//!
//! Yields a fixed list of draws in order, then starts over from the top.
//!
//! ```ignore
//! let mut rng = ScriptedRandomSource::new([0.1, 0.9]);
//! assert_eq!(rng.next_draw().value(), 0.1);
//! ```

use std::collections::VecDeque;

use crate::domain::foundation::UnitDraw;
use crate::ports::RandomSource;

/// `RandomSource` that replays a script of draws.
#[derive(Debug, Clone)]
pub struct ScriptedRandomSource {
    script: Vec<UnitDraw>,
    pending: VecDeque<UnitDraw>,
    drawn: usize,
}

impl ScriptedRandomSource {
    /// Values outside `[0, 1)` are clamped into range. An empty script
    /// always yields `0.0`.
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        let script: Vec<UnitDraw> = draws.into_iter().map(UnitDraw::saturating).collect();
        Self {
            pending: script.iter().copied().collect(),
            script,
            drawn: 0,
        }
    }

    /// Number of draws consumed so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSource for ScriptedRandomSource {
    fn next_draw(&mut self) -> UnitDraw {
        if self.pending.is_empty() {
            self.pending.extend(self.script.iter().copied());
        }
        self.drawn += 1;
        self.pending
            .pop_front()
            .unwrap_or_else(|| UnitDraw::saturating(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_script_in_order_then_wraps() {
        let mut rng = ScriptedRandomSource::new([0.1, 0.9]);

        let values: Vec<f64> = (0..4).map(|_| rng.next_draw().value()).collect();

        assert_eq!(values, vec![0.1, 0.9, 0.1, 0.9]);
        assert_eq!(rng.drawn(), 4);
    }

    #[test]
    fn empty_script_yields_zero() {
        let mut rng = ScriptedRandomSource::new(Vec::new());
        assert_eq!(rng.next_draw().value(), 0.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut rng = ScriptedRandomSource::new([1.5, -0.2]);
        assert!(rng.next_draw().value() < 1.0);
        assert_eq!(rng.next_draw().value(), 0.0);
    }
}
