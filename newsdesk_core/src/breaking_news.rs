//! Breaking-news controller: the asynchronous, globally exclusive interrupt.
//!
//! # State machine
//!
//! ```text
//!            try_trigger()                 hold elapsed
//!   Idle ──────────────────► Active ──────────────────► Idle
//!     │                        │
//!     └──────── stop() ────────┴──────────► Stopped
//! ```
//!
//! The `active` flag is an atomic so round-phase waiters can read it while
//! holding the round lock without ever touching this controller's lock.
//! Waking those waiters when the flag clears is the observer's job.

use crate::delay::{self, InterruptSignal, Wake};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsPhase {
    Idle,
    Active,
    Stopped,
}

/// Receives the controller's transitions.
///
/// Called from the controller thread without any controller lock held.
pub trait NewsObserver: Send + Sync {
    /// Breaking news went on air.
    fn news_started(&self);

    /// The hold elapsed; called while `active` is still set.
    fn news_ended(&self);

    /// `active` has been cleared. Wake anything blocked on it.
    fn news_cleared(&self);
}

/// Owns the breaking-news flag, its interrupt signal, and the hold timer.
#[derive(Debug)]
pub struct BreakingNewsController {
    phase: Mutex<NewsPhase>,
    cond: Condvar,
    active: AtomicBool,
    /// Raised once per activation; speakers arm their delay against it
    interrupt: InterruptSignal,
    /// Never raised; closed on stop so a hold in progress ends promptly
    hold_signal: InterruptSignal,
    hold: Duration,
    activations: AtomicUsize,
}

impl BreakingNewsController {
    /// Creates an idle controller with the given on-air hold.
    pub fn new(hold: Duration) -> Self {
        Self {
            phase: Mutex::new(NewsPhase::Idle),
            cond: Condvar::new(),
            active: AtomicBool::new(false),
            interrupt: InterruptSignal::new(),
            hold_signal: InterruptSignal::new(),
            hold,
            activations: AtomicUsize::new(0),
        }
    }

    /// Starts breaking news unless it is already on air or stopped.
    ///
    /// Sets `active`, raises the interrupt once, and hands the hold to the
    /// controller thread. Returns false if nothing was triggered.
    pub fn try_trigger(&self) -> bool {
        {
            let mut phase = self.lock();
            if *phase != NewsPhase::Idle {
                return false;
            }
            *phase = NewsPhase::Active;
            self.active.store(true, Ordering::SeqCst);
            self.activations.fetch_add(1, Ordering::SeqCst);
            self.cond.notify_all();
        }
        self.interrupt.raise();
        true
    }

    /// Runs the controller loop until `stop()` is called.
    pub fn run(&self, observer: &dyn NewsObserver) {
        loop {
            {
                let phase = self.lock();
                let phase = self
                    .cond
                    .wait_while(phase, |p| *p == NewsPhase::Idle)
                    .unwrap_or_else(PoisonError::into_inner);
                if *phase == NewsPhase::Stopped {
                    break;
                }
            }

            observer.news_started();
            let wake = delay::sleep(&self.hold_signal, self.hold);
            if wake == Wake::Elapsed {
                observer.news_ended();
            }

            {
                let mut phase = self.lock();
                if *phase == NewsPhase::Active {
                    *phase = NewsPhase::Idle;
                }
                self.active.store(false, Ordering::SeqCst);
            }
            observer.news_cleared();

            if wake == Wake::Closed {
                break;
            }
        }
        debug!("breaking news controller stopped");
    }

    /// Moves to `Stopped` and wakes the controller thread and every delay.
    pub fn stop(&self) {
        {
            let mut phase = self.lock();
            *phase = NewsPhase::Stopped;
            self.active.store(false, Ordering::SeqCst);
            self.cond.notify_all();
        }
        self.hold_signal.close();
        self.interrupt.close();
    }

    /// Returns true while breaking news is on air.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> NewsPhase {
        *self.lock()
    }

    /// The signal raised on every activation.
    pub fn interrupt(&self) -> &InterruptSignal {
        &self.interrupt
    }

    /// Number of activations so far.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    // A single enum behind the lock cannot be left half-written.
    fn lock(&self) -> MutexGuard<'_, NewsPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
