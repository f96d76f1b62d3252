//! Timestamped record of every protocol event.
//!
//! Each event is logged once through `tracing` as `[mm:ss.mmm] <text>` and
//! kept in memory so callers can inspect or export the run afterwards.

use newsdesk_env::{CommentatorId, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Something that happened on the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelEvent {
    /// The moderator opened a question
    QuestionAsked { question: usize },

    /// A commentator chose to answer
    Queued {
        commentator: CommentatorId,
        question: usize,
        position: usize,
    },

    /// A commentator chose not to answer
    Skipped {
        commentator: CommentatorId,
        question: usize,
    },

    /// A commentator took the floor for a sampled duration
    Speaking {
        commentator: CommentatorId,
        question: usize,
        seconds: f64,
    },

    /// The speech ran its full length
    Finished {
        commentator: CommentatorId,
        question: usize,
        spoke_ms: u64,
    },

    /// Breaking news interrupted the speech
    CutShort {
        commentator: CommentatorId,
        question: usize,
        spoke_ms: u64,
    },

    /// The moderator acknowledged a skip
    SkipAcknowledged {
        commentator: CommentatorId,
        question: usize,
    },

    BreakingNewsStarted,

    BreakingNewsEnded,

    /// The moderator finished every round
    GameOver { rounds: usize },
}

impl PanelEvent {
    /// Returns the commentator this event concerns, if any.
    pub fn commentator(&self) -> Option<CommentatorId> {
        match self {
            PanelEvent::Queued { commentator, .. }
            | PanelEvent::Skipped { commentator, .. }
            | PanelEvent::Speaking { commentator, .. }
            | PanelEvent::Finished { commentator, .. }
            | PanelEvent::CutShort { commentator, .. }
            | PanelEvent::SkipAcknowledged { commentator, .. } => Some(*commentator),
            _ => None,
        }
    }

    /// Returns the question this event belongs to, if any.
    pub fn question(&self) -> Option<usize> {
        match self {
            PanelEvent::QuestionAsked { question }
            | PanelEvent::Queued { question, .. }
            | PanelEvent::Skipped { question, .. }
            | PanelEvent::Speaking { question, .. }
            | PanelEvent::Finished { question, .. }
            | PanelEvent::CutShort { question, .. }
            | PanelEvent::SkipAcknowledged { question, .. } => Some(*question),
            _ => None,
        }
    }
}

impl std::fmt::Display for PanelEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelEvent::QuestionAsked { question } => {
                write!(f, "Moderator asked Question {}", question)
            }
            PanelEvent::Queued {
                commentator,
                position,
                ..
            } => write!(
                f,
                "Commentator {} generates answer, position in queue: {}",
                commentator, position
            ),
            PanelEvent::Skipped {
                commentator,
                question,
            } => write!(f, "Commentator {} passes on Question {}", commentator, question),
            PanelEvent::Speaking {
                commentator,
                seconds,
                ..
            } => write!(
                f,
                "Commentator {}'s turn to speak for {:.3} seconds",
                commentator, seconds
            ),
            PanelEvent::Finished { commentator, .. } => {
                write!(f, "Commentator {} finished speaking", commentator)
            }
            PanelEvent::CutShort { commentator, .. } => write!(
                f,
                "Commentator {} is cut short due to a breaking news",
                commentator
            ),
            PanelEvent::SkipAcknowledged { commentator, .. } => {
                write!(f, "Moderator moves past Commentator {}", commentator)
            }
            PanelEvent::BreakingNewsStarted => write!(f, "Breaking news!"),
            PanelEvent::BreakingNewsEnded => write!(f, "Breaking news ends!"),
            PanelEvent::GameOver { rounds } => {
                write!(f, "Moderator closes the panel after {} questions", rounds)
            }
        }
    }
}

/// A journaled event with its elapsed-time stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub at: Timestamp,
    #[serde(flatten)]
    pub event: PanelEvent,
}

/// Append-only event log shared by every agent.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and logs it.
    pub fn record(&self, at: Timestamp, event: PanelEvent) {
        info!("[{}] {}", at, event);
        self.lock().push(JournalEntry { at, event });
    }

    /// Returns a copy of every entry so far, in record order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock().clone()
    }

    /// Returns the events without their stamps.
    pub fn events(&self) -> Vec<PanelEvent> {
        self.lock().iter().map(|entry| entry.event.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Pushes are the only mutation; a poisoned log is still a valid prefix.
    fn lock(&self) -> MutexGuard<'_, Vec<JournalEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
