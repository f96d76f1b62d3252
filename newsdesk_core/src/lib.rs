//! Newsdesk Core - turn coordination for a moderated panel
//!
//! A moderator asks Q questions of N commentators. Each commentator decides
//! whether to answer; answerers speak one at a time in the order they
//! decided, and the moderator acknowledges everyone who passed before the
//! next question. Breaking news can go on air at any moment: it cuts the
//! current speaker short and freezes the round until it ends.
//!
//! # Actors
//!
//! | Actor                    | Thread | Drives                                   |
//! |--------------------------|--------|------------------------------------------|
//! | `TurnCoordinator`        | 1      | announce, floor grants, skip acks        |
//! | `CommentatorAgent`       | N      | decisions, speeches, ack confirmations   |
//! | `BreakingNewsController` | 1      | on-air hold after each activation        |
//!
//! All of them meet on one [`Studio`]: a single round lock, one broadcast
//! condition variable, and the breaking-news flag. The round transitions
//! themselves live in [`RoundState`], which never blocks and can be driven
//! single-threaded.
//!
//! # Example
//!
//! ```ignore
//! use newsdesk_core::{SimulationConfig, Studio, TurnCoordinator};
//!
//! let studio = Studio::shared(SimulationConfig::default())?;
//! // spawn the news controller and one CommentatorAgent per id, then:
//! let rounds = TurnCoordinator::new(studio).run()?;
//! ```

pub mod breaking_news;
pub mod commentator;
pub mod config;
pub mod coordinator;
pub mod delay;
pub mod error;
pub mod journal;
pub mod ready_queue;
pub mod round;
pub mod studio;

pub use breaking_news::{BreakingNewsController, NewsObserver, NewsPhase};
pub use commentator::{CommentatorAgent, SpeechOutcome};
pub use config::SimulationConfig;
pub use coordinator::{CoordinatorState, TurnCoordinator};
pub use delay::{InterruptSignal, InterruptibleDelay, Wake};
pub use error::{ConfigError, ProtocolViolation};
pub use journal::{Journal, JournalEntry, PanelEvent};
pub use ready_queue::ReadyQueue;
pub use round::{Decision, DecisionOutcome, Phase, RoundState, TurnOwner};
pub use studio::Studio;
