//! Random Source Port - injected uniform randomness.
//!
//! Everything that rolls dice takes a `RandomSource` so tests can script
//! or seed the outcome.

use crate::domain::foundation::UnitDraw;

/// Port for uniform random draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_draw(&mut self) -> UnitDraw;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        self.next_draw().pick_index(len)
    }

    /// True with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool {
        self.next_draw().value() < p.clamp(0.0, 1.0)
    }
}
