//! Seeded Random Source Adapter
//!
//! Wraps `rand::rngs::StdRng`. Seed it for reproducible runs, or draw a seed
//! from the OS for production.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::foundation::UnitDraw;
use crate::ports::RandomSource;

/// `RandomSource` backed by a standard PRNG.
#[derive(Debug, Clone)]
pub struct SeededRandomSource {
    rng: StdRng,
}

impl SeededRandomSource {
    /// Deterministic source for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn next_draw(&mut self) -> UnitDraw {
        // gen::<f64>() is uniform in [0, 1)
        UnitDraw::saturating(self.rng.gen::<f64>())
    }
}
