//! Driver errors.

use newsdesk_core::{ConfigError, ProtocolViolation};
use newsdesk_env::EnvError;
use thiserror::Error;

/// Everything that can stop a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("Random source: {0}")]
    Env(#[from] EnvError),

    /// A panel thread panicked instead of returning
    #[error("Thread '{0}' panicked")]
    AgentPanicked(String),

    #[error("Failed to spawn thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
