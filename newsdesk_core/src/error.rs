//! Error types for the panel coordination engine.

use crate::round::{Phase, TurnOwner};
use newsdesk_env::CommentatorId;
use thiserror::Error;

/// Invalid simulation parameters. Fatal at startup, before any thread runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The panel needs at least one commentator
    #[error("Participant count must be greater than zero")]
    NoParticipants,

    /// The moderator needs at least one question
    #[error("Question count must be greater than zero")]
    NoQuestions,

    /// A probability lies outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    /// Speeches last at least one second
    #[error("Maximum speak duration must be at least 1 second, got {0}")]
    SpeakDurationTooShort(f64),

    /// Tick interval or news hold is negative, zero where not allowed, or not finite
    #[error("{name} is not a valid interval: {value}")]
    InvalidInterval { name: &'static str, value: f64 },

    /// A simulated second must take some wall-clock time
    #[error("Pace must be non-zero")]
    ZeroPace,
}

/// A coordination bug: an operation arrived in a phase that cannot accept it.
///
/// These are invariant failures, never retried. Threaded agents stop the
/// whole simulation when they observe one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// Id outside `0..N`
    #[error("Unknown commentator {0}")]
    UnknownCommentator(CommentatorId),

    /// Operation attempted while the other side owns the turn
    #[error("Expected turn owner {expected:?}, found {actual:?}")]
    WrongTurn { expected: TurnOwner, actual: TurnOwner },

    /// Commentator is not in the phase the operation requires
    #[error("Commentator {id} is {actual:?}, expected {expected:?}")]
    UnexpectedPhase {
        id: CommentatorId,
        expected: Phase,
        actual: Phase,
    },

    /// Commentator already decided on this question
    #[error("Commentator {id} already decided on question {question}")]
    AlreadyDecided { id: CommentatorId, question: usize },

    /// Commentator pushed onto the ready queue twice in one round
    #[error("Commentator {0} is already queued")]
    AlreadyQueued(CommentatorId),

    /// Ready queue holds one entry per participant at most
    #[error("Ready queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// A decision arrived after every decision was counted
    #[error("No decisions are pending")]
    NoPendingDecisions,

    /// Draining started before every commentator decided
    #[error("{0} decisions are still pending")]
    DecisionsPending(usize),

    /// Speak signal for a commentator that does not hold the floor
    #[error("Commentator {0} does not hold the floor")]
    NotOnFloor(CommentatorId),

    /// Floor granted while another speaker still holds it
    #[error("Floor is still held by commentator {0}")]
    FloorOccupied(CommentatorId),

    /// Skip acknowledgment for a commentator that is not being acknowledged
    #[error("Commentator {0} is not awaiting a skip acknowledgment")]
    NotAwaitingAck(CommentatorId),

    /// Round closed or a new one announced with work outstanding
    #[error("Question {question} still has {outstanding} commentators outstanding")]
    RoundIncomplete { question: usize, outstanding: usize },

    /// A thread panicked while holding the round lock
    #[error("Round lock poisoned")]
    LockPoisoned,
}
