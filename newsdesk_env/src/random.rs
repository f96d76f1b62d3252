//! Core entropy trait for Newsdesk agents.

/// The injectable source of uniform randomness.
///
/// Every probabilistic choice in the panel protocol goes through this trait:
/// one draw per commentator decision, one per speak-duration sample and one
/// per breaking-news tick. Swapping the implementation is the only thing a
/// test needs to do to make the protocol's choices deterministic.
///
/// # Implementations
///
/// - **Production**: `SystemRandom` - `StdRng` seeded from OS entropy
/// - **Replay**: `SeededRandom` - `ChaCha8Rng(seed)`
/// - **Scripted**: `ScriptedRandom` - a fixed, cycling sequence
///
/// Implementations are shared by every agent thread, so they take `&self`
/// and synchronize internally.
pub trait RandomSource: Send + Sync + 'static {
    /// Returns the next uniform value in `[0, 1)`.
    fn next_unit(&self) -> f64;

    /// Returns the seed behind this source (for logging/debugging).
    ///
    /// Sources that are not seeded return 0.
    fn seed(&self) -> u64;
}
