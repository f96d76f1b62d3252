//! Production implementation of RandomSource backed by OS entropy.

use crate::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

/// Production randomness seeded from the operating system.
///
/// This is the "real" implementation used by the CLI when no seed is given.
pub struct SystemRandom {
    rng: Mutex<StdRng>,
}

impl SystemRandom {
    /// Creates a new SystemRandom.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates an Arc-wrapped source for sharing across agent threads.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&self) -> f64 {
        // A panicking holder cannot leave StdRng in an invalid state.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen::<f64>()
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_random_range() {
        let random = SystemRandom::new();
        for _ in 0..1000 {
            let value = random.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_system_random_seed() {
        let random = SystemRandom::new();
        assert_eq!(random.seed(), 0);
    }
}
