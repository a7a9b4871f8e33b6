//! Randomness sources for the simulation
//!
//! Every stochastic draw in the simulation goes through [`RandomSource`], so a
//! run can be replayed from a seed or pinned to fixed values in tests.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Uniform random draws over bounded ranges
pub trait RandomSource {
    /// Draw an integer uniformly from `min..=max`
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64;

    /// Draw a float uniformly from `min..max`. Returns `min` when the range is empty.
    fn float_range(&mut self, min: f64, max: f64) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64 {
        (**self).int_inclusive(min, max)
    }

    fn float_range(&mut self, min: f64, max: f64) -> f64 {
        (**self).float_range(min, max)
    }
}

/// Random source backed by a seeded `StdRng`
#[derive(Debug, Clone)]
pub struct StdRandom {
    seed: u64,
    rng: StdRng,
}

impl StdRandom {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from the thread RNG. The chosen seed is kept so the run can be replayed.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for StdRandom {
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    fn float_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..max)
    }
}

/// Deterministic source that lands every draw at the same relative point of
/// the requested range. A fraction of 0.0 yields the minimum. A fraction of
/// 1.0 yields the maximum of an integer range, and a value just below the
/// exclusive maximum of a float range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRandom {
    pub fraction: f64,
}

impl FixedRandom {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    /// Always draw the minimum of the range
    pub fn minimum() -> Self {
        Self::new(0.0)
    }
}

impl RandomSource for FixedRandom {
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let span = max as f64 - min as f64 + 1.0;
        let offset = (self.fraction * span).floor() as i64;
        min.saturating_add(offset).min(max)
    }

    fn float_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        let value = min + self.fraction * (max - min);
        if value < max {
            value
        } else {
            // Step down until strictly below the exclusive bound
            let mut below = max - (max - min) * f64::EPSILON;
            while below >= max {
                below = min + (below - min) * 0.5;
            }
            below
        }
    }
}
