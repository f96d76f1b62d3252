//! Game clock and human-readable elapsed-time stamps.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// The single relative start instant of a simulation.
///
/// The clock is created unstarted and is started exactly once, when the
/// moderator begins round 1. Every log timestamp is the time elapsed since
/// that instant; anything observed before the start is stamped `00:00.000`.
#[derive(Debug, Default)]
pub struct GameClock {
    start: OnceLock<Instant>,
}

impl GameClock {
    /// Creates an unstarted clock.
    pub fn new() -> Self {
        Self {
            start: OnceLock::new(),
        }
    }

    /// Creates an Arc-wrapped clock for sharing across threads.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Records the start instant. Later calls keep the first instant.
    pub fn start(&self) -> Instant {
        *self.start.get_or_init(Instant::now)
    }

    /// Returns true once `start()` has been called.
    pub fn is_started(&self) -> bool {
        self.start.get().is_some()
    }

    /// Returns the time elapsed since the start instant.
    pub fn elapsed(&self) -> Duration {
        self.start
            .get()
            .map(Instant::elapsed)
            .unwrap_or(Duration::ZERO)
    }

    /// Returns the current elapsed time as a printable stamp.
    pub fn stamp(&self) -> Timestamp {
        Timestamp(self.elapsed())
    }
}

/// Elapsed simulation time, printed as `mm:ss.mmm`.
///
/// Serialized as whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u64", from = "u64")]
pub struct Timestamp(pub Duration);

impl Timestamp {
    /// Returns the wrapped duration.
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Returns the stamp in whole milliseconds.
    pub fn as_millis(&self) -> u64 {
        u64::try_from(self.0.as_millis()).unwrap_or(u64::MAX)
    }
}

impl From<Timestamp> for u64 {
    fn from(stamp: Timestamp) -> Self {
        stamp.as_millis()
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total_millis = self.as_millis();
        let minutes = total_millis / 60_000;
        let seconds = (total_millis / 1_000) % 60;
        let millis = total_millis % 1_000;
        write!(f, "{:02}:{:02}.{:03}", minutes, seconds, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        assert_eq!(Timestamp(Duration::ZERO).to_string(), "00:00.000");
        assert_eq!(Timestamp(Duration::from_millis(1_250)).to_string(), "00:01.250");
        assert_eq!(Timestamp(Duration::from_millis(754_007)).to_string(), "12:34.007");
    }

    #[test]
    fn test_timestamp_millis_conversion() {
        let stamp = Timestamp::from(1_500);
        assert_eq!(stamp.as_duration(), Duration::from_millis(1_500));
        assert_eq!(u64::from(stamp), 1_500);
    }

    #[test]
    fn test_game_clock_unstarted_is_zero() {
        let clock = GameClock::new();
        assert!(!clock.is_started());
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_game_clock_start_is_sticky() {
        let clock = GameClock::new();
        let first = clock.start();
        std::thread::sleep(Duration::from_millis(5));
        let second = clock.start();

        assert_eq!(first, second);
        assert!(clock.elapsed() >= Duration::from_millis(5));
    }
}
