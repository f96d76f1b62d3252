//! Newsdesk Environment Abstraction Layer
//!
//! This crate isolates every source of non-determinism the panel protocol
//! touches, so the coordination engine in `newsdesk_core` can run against
//! real entropy in production and against a fixed script in tests:
//! - Randomness (`RandomSource::next_unit()`)
//! - Time (`GameClock::elapsed()`)
//!
//! # Implementations
//!
//! | Source            | Use                                        |
//! |-------------------|--------------------------------------------|
//! | `SystemRandom`    | Production, seeded from OS entropy         |
//! | `SeededRandom`    | Reproducible runs from a 64-bit seed       |
//! | `ScriptedRandom`  | Fixed sequences for deterministic scenarios|
//!
//! # Example
//!
//! ```ignore
//! use newsdesk_env::{RandomSource, ScriptedRandom};
//!
//! let random = ScriptedRandom::new(vec![0.0, 0.5])?;
//! assert_eq!(random.next_unit(), 0.0);
//! ```

mod clock;
mod error;
mod random;
mod scripted;
mod seeded;
mod system_impl;
mod types;

pub use clock::{GameClock, Timestamp};
pub use error::EnvError;
pub use random::RandomSource;
pub use scripted::ScriptedRandom;
pub use seeded::SeededRandom;
pub use system_impl::SystemRandom;
pub use types::CommentatorId;
