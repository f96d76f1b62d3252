//! Interruptible delay: a timed wait that a broadcast signal can cut short.
//!
//! # Protocol
//!
//! An [`InterruptSignal`] carries a generation counter. Raising the signal
//! bumps the generation and wakes every waiter. A waiter snapshots the
//! generation when it *arms* its delay and wakes early only if the counter
//! moves past that snapshot:
//!
//! ```text
//!   arm() ──► gen = 7 ──► wait(D) ─┬─ gen == 7 at deadline ──► Elapsed
//!                                  ├─ gen != 7              ──► Interrupted
//!                                  └─ signal closed         ──► Closed
//! ```
//!
//! Nothing is consumed on wake, so concurrent waiters never steal each
//! other's interrupt, and an interrupt raised before a waiter armed never
//! reaches it.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Why an [`InterruptibleDelay`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The full duration passed
    Elapsed,
    /// The signal was raised after the delay was armed
    Interrupted,
    /// The signal was closed for shutdown
    Closed,
}

impl Wake {
    /// Returns true if the wait ended before its duration.
    pub fn is_early(&self) -> bool {
        !matches!(self, Wake::Elapsed)
    }
}

#[derive(Debug, Default)]
struct SignalState {
    generation: u64,
    closed: bool,
}

/// A broadcast wake-up shared by any number of delayed threads.
#[derive(Debug, Default)]
pub struct InterruptSignal {
    state: Mutex<SignalState>,
    cond: Condvar,
}

impl InterruptSignal {
    /// Creates an open signal at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wakes every armed delay. Returns the new generation.
    pub fn raise(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        self.cond.notify_all();
        state.generation
    }

    /// Wakes every delay with [`Wake::Closed`]; delays armed later return at once.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.cond.notify_all();
    }

    /// Returns true once the signal has been closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns how many times the signal has been raised.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    // The state is two plain fields updated together, so a poisoned
    // guard still holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A delay armed against an [`InterruptSignal`].
#[derive(Debug)]
pub struct InterruptibleDelay<'a> {
    signal: &'a InterruptSignal,
    armed_at: u64,
}

impl<'a> InterruptibleDelay<'a> {
    /// Snapshots the signal generation. Only raises after this point interrupt.
    pub fn arm(signal: &'a InterruptSignal) -> Self {
        Self {
            signal,
            armed_at: signal.generation(),
        }
    }

    /// Blocks until `duration` passes, the signal is raised, or it is closed.
    ///
    /// A duration too long to put on the clock waits for the signal alone.
    pub fn wait(self, duration: Duration) -> Wake {
        let deadline = Instant::now().checked_add(duration);
        let mut state = self.signal.lock();

        loop {
            if state.closed {
                return Wake::Closed;
            }
            if state.generation != self.armed_at {
                return Wake::Interrupted;
            }
            state = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Wake::Elapsed;
                    }
                    self.signal
                        .cond
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .signal
                    .cond
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}

/// Arms and waits in one step.
pub fn sleep(signal: &InterruptSignal, duration: Duration) -> Wake {
    InterruptibleDelay::arm(signal).wait(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_delay_elapses_without_signal() {
        let signal = InterruptSignal::new();
        let start = Instant::now();

        let wake = sleep(&signal, Duration::from_millis(30));

        assert_eq!(wake, Wake::Elapsed);
        assert!(!wake.is_early());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_zero_delay_elapses_immediately() {
        let signal = InterruptSignal::new();
        assert_eq!(sleep(&signal, Duration::ZERO), Wake::Elapsed);
    }

    #[test]
    fn test_raise_interrupts_waiter() {
        let signal = Arc::new(InterruptSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let start = Instant::now();
                let wake = sleep(&signal, Duration::from_secs(10));
                (wake, start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(30));
        signal.raise();

        let (wake, elapsed) = waiter.join().unwrap();
        assert_eq!(wake, Wake::Interrupted);
        assert!(elapsed < Duration::from_secs(10));
    }

    #[test]
    fn test_unbounded_delay_still_wakes_on_close() {
        let signal = Arc::new(InterruptSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || sleep(&signal, Duration::MAX))
        };

        thread::sleep(Duration::from_millis(30));
        signal.close();

        assert_eq!(waiter.join().unwrap(), Wake::Closed);
    }

    #[test]
    fn test_raise_wakes_every_waiter() {
        let signal = Arc::new(InterruptSignal::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = Arc::clone(&signal);
                thread::spawn(move || sleep(&signal, Duration::from_secs(10)))
            })
            .collect();

        thread::sleep(Duration::from_millis(30));
        signal.raise();

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Wake::Interrupted);
        }
    }

    #[test]
    fn test_raise_before_arm_is_not_seen() {
        let signal = InterruptSignal::new();
        signal.raise();

        let delay = InterruptibleDelay::arm(&signal);
        assert_eq!(delay.wait(Duration::from_millis(10)), Wake::Elapsed);
        assert_eq!(signal.generation(), 1);
    }

    #[test]
    fn test_armed_delay_sees_raise_before_wait() {
        let signal = InterruptSignal::new();
        let delay = InterruptibleDelay::arm(&signal);
        signal.raise();

        assert_eq!(delay.wait(Duration::from_secs(10)), Wake::Interrupted);
    }

    #[test]
    fn test_close_wakes_and_sticks() {
        let signal = Arc::new(InterruptSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || sleep(&signal, Duration::from_secs(10)))
        };

        thread::sleep(Duration::from_millis(20));
        signal.close();

        assert_eq!(waiter.join().unwrap(), Wake::Closed);
        assert!(signal.is_closed());
        assert_eq!(sleep(&signal, Duration::from_secs(10)), Wake::Closed);
    }
}
