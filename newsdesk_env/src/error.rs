//! Error types for the Newsdesk environment abstraction.

use thiserror::Error;

/// Errors that can occur while building an environment source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    /// A scripted source needs at least one value
    #[error("Random script is empty")]
    EmptyScript,

    /// Scripted values must be uniform draws in [0, 1)
    #[error("Random value {0} is outside [0, 1)")]
    OutOfRange(f64),
}
