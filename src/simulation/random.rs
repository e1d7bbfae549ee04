//! Random number sources for the simulation
//!
//! Every probabilistic decision goes through a `RandomSource` owned by the
//! engine, so a seeded source makes whole runs reproducible.

use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the draws used by placement, behavior assignment and the update rules
pub trait RandomSource: Send {
    /// Uniform float in [0, 1)
    fn uniform(&mut self) -> f64;

    /// Uniform integer in `low..=high`
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32;

    /// Index drawn with probability proportional to its weight
    /// Returns None when the weights cannot form a distribution
    fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize>;

    /// `true` with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }
}

/// `RandomSource` backed by a `StdRng`
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a reproducible source from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.rng.random_range(low..=high)
    }

    fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let distribution = WeightedIndex::new(weights).ok()?;
        Some(self.rng.sample(&distribution))
    }
}
