//! Studio - the shared board every panel thread rendezvous on.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Studio                             │
//! │  ┌────────────────────────────┐   ┌───────────────────────┐  │
//! │  │ round: Mutex<RoundState>   │   │ BreakingNewsController│  │
//! │  │ turn:  Condvar (broadcast) │◄──│  active (atomic)      │  │
//! │  └────────────────────────────┘   │  interrupt signal     │  │
//! │        ▲              ▲           └───────────────────────┘  │
//! │  TurnCoordinator  CommentatorAgent ×N                        │
//! │                                                              │
//! │  GameClock ── Journal (timestamped PanelEvents)              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All round-phase waits go through one condition variable on the round
//! lock. Waiters read the breaking-news flag inside their predicate; the
//! controller notifies that same condition variable (through
//! [`NewsObserver`]) after the flag clears, so no wait ever holds the round
//! lock while blocking on the news lock.

use crate::breaking_news::{BreakingNewsController, NewsObserver};
use crate::config::SimulationConfig;
use crate::error::{ConfigError, ProtocolViolation};
use crate::journal::{Journal, PanelEvent};
use crate::round::RoundState;
use newsdesk_env::GameClock;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Shared state of one panel simulation.
#[derive(Debug)]
pub struct Studio {
    config: SimulationConfig,
    round: Mutex<RoundState>,
    turn: Condvar,
    news: BreakingNewsController,
    clock: GameClock,
    journal: Journal,
}

impl Studio {
    /// Validates the config and builds a fresh studio.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let news = BreakingNewsController::new(config.news_hold());

        Ok(Self {
            round: Mutex::new(RoundState::new(config.participants)),
            turn: Condvar::new(),
            news,
            clock: GameClock::new(),
            journal: Journal::new(),
            config,
        })
    }

    /// Creates an Arc-wrapped studio for sharing across agent threads.
    pub fn shared(config: SimulationConfig) -> Result<Arc<Self>, ConfigError> {
        Self::new(config).map(Arc::new)
    }

    /// Acquires the round lock.
    pub fn lock_round(&self) -> Result<MutexGuard<'_, RoundState>, ProtocolViolation> {
        self.round.lock().map_err(|_| ProtocolViolation::LockPoisoned)
    }

    /// Blocks on the round condition until `ready` holds or the game ends.
    ///
    /// Returns `None` if the game ended first. The predicate is re-checked on
    /// every wake, so spurious and unrelated broadcasts are harmless.
    pub fn wait_until<'a, F>(
        &self,
        guard: MutexGuard<'a, RoundState>,
        mut ready: F,
    ) -> Result<Option<MutexGuard<'a, RoundState>>, ProtocolViolation>
    where
        F: FnMut(&RoundState) -> bool,
    {
        let guard = self
            .turn
            .wait_while(guard, |round| !round.is_game_over() && !ready(&*round))
            .map_err(|_| ProtocolViolation::LockPoisoned)?;

        if guard.is_game_over() {
            Ok(None)
        } else {
            Ok(Some(guard))
        }
    }

    /// Like [`Studio::wait_until`], additionally requiring breaking news to be off air.
    pub fn wait_until_clear<'a, F>(
        &self,
        guard: MutexGuard<'a, RoundState>,
        mut ready: F,
    ) -> Result<Option<MutexGuard<'a, RoundState>>, ProtocolViolation>
    where
        F: FnMut(&RoundState) -> bool,
    {
        let news = &self.news;
        self.wait_until(guard, |round| !news.is_active() && ready(round))
    }

    /// Wakes every thread waiting on a round phase.
    pub fn broadcast(&self) {
        self.turn.notify_all();
    }

    /// Records an event stamped with the game clock.
    pub fn record(&self, event: PanelEvent) {
        self.journal.record(self.clock.stamp(), event);
    }

    /// Ends the game: sets the end flag and wakes every wait in the system.
    ///
    /// Safe to call more than once and from any agent.
    pub fn shutdown(&self) {
        match self.round.lock() {
            Ok(mut round) => round.finish_game(),
            Err(poisoned) => poisoned.into_inner().finish_game(),
        }
        self.turn.notify_all();
        self.news.stop();
        debug!("studio shut down");
    }

    /// Stops the game after a protocol violation.
    pub fn abort(&self, violation: &ProtocolViolation) {
        warn!("aborting panel: {}", violation);
        self.shutdown();
    }

    /// Returns true once the game has ended.
    pub fn is_over(&self) -> bool {
        match self.round.lock() {
            Ok(round) => round.is_game_over(),
            Err(poisoned) => poisoned.into_inner().is_game_over(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn news(&self) -> &BreakingNewsController {
        &self.news
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

impl NewsObserver for Studio {
    fn news_started(&self) {
        self.record(PanelEvent::BreakingNewsStarted);
    }

    fn news_ended(&self) {
        self.record(PanelEvent::BreakingNewsEnded);
    }

    fn news_cleared(&self) {
        // Taking the round lock orders this notify after any waiter that
        // read the flag as set has started waiting.
        let _round = self.round.lock();
        self.turn.notify_all();
    }
}
