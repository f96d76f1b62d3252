//! Scripted randomness for deterministic scenarios.

use crate::error::EnvError;
use crate::RandomSource;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays a fixed sequence of values, cycling when it runs out.
///
/// Used for scenarios where the exact draws matter, e.g. a panel where every
/// commentator must answer (`[0.0]` with `p = 1.0`) or nobody may (`p = 0.0`).
#[derive(Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl ScriptedRandom {
    /// Creates a script from the given values.
    ///
    /// # Errors
    /// * `EnvError::EmptyScript` - no values were supplied
    /// * `EnvError::OutOfRange` - a value lies outside `[0, 1)`
    pub fn new(values: Vec<f64>) -> Result<Self, EnvError> {
        if values.is_empty() {
            return Err(EnvError::EmptyScript);
        }
        if let Some(&bad) = values.iter().find(|v| !(0.0..1.0).contains(*v)) {
            return Err(EnvError::OutOfRange(bad));
        }

        Ok(Self {
            values,
            cursor: AtomicUsize::new(0),
        })
    }

    /// A script that always returns the same value.
    pub fn constant(value: f64) -> Result<Self, EnvError> {
        Self::new(vec![value])
    }

    /// Returns how many values have been drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.values[index % self.values.len()]
    }

    fn seed(&self) -> u64 {
        0
    }
}
