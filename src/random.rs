//! Random-number capability consumed by the engine.
//!
//! The engine only needs two operations: a uniform deviate in `[0, 1)` and a
//! uniform integer in `[0, n]`. Any [`rand::Rng`] provides both, so a seeded
//! [`StdRng`] is the usual source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random numbers.
///
/// Implementations must be deterministic for a fixed seed: the same seed
/// yields the same sequence, which makes whole runs reproducible.
pub trait RandomSource {
    /// Returns a uniform deviate in `[0, 1)`.
    fn rand(&mut self) -> f64;

    /// Returns a uniform integer in `[0, n]` (inclusive).
    fn rand_int(&mut self, n: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn rand(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn rand_int(&mut self, n: usize) -> usize {
        self.random_range(0..=n)
    }
}

/// Creates a seeded, reproducible RNG.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
