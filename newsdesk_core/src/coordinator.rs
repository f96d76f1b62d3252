//! TurnCoordinator - the moderator's round state machine.
//!
//! ```text
//! AwaitingClear ─► Announcing ─► AwaitingDecisions ─► DrainingQueue
//!       ▲                                                  │
//!       │                                                  ▼
//!  RoundComplete ◄──────────────────────────────────── AckingSkipped
//!       │
//!       └── after Q rounds ─► GameOver
//! ```
//!
//! Every hand-off (announce, floor grant, skip acknowledgment) waits for
//! breaking news to be off air first.

use crate::error::ProtocolViolation;
use crate::journal::PanelEvent;
use crate::round::{RoundState, TurnOwner};
use crate::studio::Studio;
use std::sync::{Arc, MutexGuard};
use tracing::{debug, error, info};

/// Moderator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    AwaitingClear,
    Announcing,
    AwaitingDecisions,
    DrainingQueue,
    AckingSkipped,
    RoundComplete,
    GameOver,
}

/// Drives Q rounds of question, answers, and acknowledgments.
pub struct TurnCoordinator {
    studio: Arc<Studio>,
    state: CoordinatorState,
}

type RoundGuard<'a> = MutexGuard<'a, RoundState>;

impl TurnCoordinator {
    pub fn new(studio: Arc<Studio>) -> Self {
        Self {
            studio,
            state: CoordinatorState::AwaitingClear,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Runs every round, then ends the game.
    ///
    /// Returns the number of completed rounds. On a protocol violation the
    /// studio is aborted and the violation returned.
    pub fn run(&mut self) -> Result<usize, ProtocolViolation> {
        self.studio.clock().start();
        let result = self.run_rounds();

        match &result {
            Ok(rounds) => {
                self.studio.record(PanelEvent::GameOver { rounds: *rounds });
                self.transition(CoordinatorState::GameOver);
                self.studio.shutdown();
            }
            Err(violation) => {
                error!("moderator hit a protocol violation: {}", violation);
                self.transition(CoordinatorState::GameOver);
                self.studio.abort(violation);
            }
        }
        result
    }

    fn run_rounds(&mut self) -> Result<usize, ProtocolViolation> {
        let questions = self.studio.config().questions;
        let mut completed = 0;

        while completed < questions {
            if !self.run_round()? {
                info!("panel ended early after {} of {} questions", completed, questions);
                break;
            }
            completed += 1;
        }
        Ok(completed)
    }

    /// Plays one round. Returns false if the game ended underneath it.
    fn run_round(&mut self) -> Result<bool, ProtocolViolation> {
        let studio = Arc::clone(&self.studio);

        self.transition(CoordinatorState::AwaitingClear);
        let round = studio.lock_round()?;
        let moderators_turn = |r: &RoundState| r.turn_owner() == TurnOwner::Moderator;
        let Some(mut round) = studio.wait_until_clear(round, moderators_turn)? else {
            return Ok(false);
        };

        self.transition(CoordinatorState::Announcing);
        let question = round.announce()?;
        studio.record(PanelEvent::QuestionAsked { question });
        studio.broadcast();

        self.transition(CoordinatorState::AwaitingDecisions);
        let Some(round) = studio.wait_until(round, |r| r.decisions_complete())? else {
            return Ok(false);
        };

        self.transition(CoordinatorState::DrainingQueue);
        let Some(round) = self.drain_queue(&studio, round)? else {
            return Ok(false);
        };

        self.transition(CoordinatorState::AckingSkipped);
        let Some(mut round) = self.ack_skipped(&studio, round)? else {
            return Ok(false);
        };

        self.transition(CoordinatorState::RoundComplete);
        round.close_round()?;
        studio.broadcast();
        debug!("question {} closed", question);
        Ok(true)
    }

    /// Hands the floor to each queued commentator in arrival order.
    fn drain_queue<'a>(
        &self,
        studio: &'a Studio,
        mut round: RoundGuard<'a>,
    ) -> Result<Option<RoundGuard<'a>>, ProtocolViolation> {
        loop {
            let Some(mut ready) = studio.wait_until_clear(round, |_| true)? else {
                return Ok(None);
            };
            let Some(speaker) = ready.grant_floor()? else {
                return Ok(Some(ready));
            };
            debug!("floor granted to {}", speaker);
            studio.broadcast();

            round = match studio.wait_until(ready, |r| r.floor_open())? {
                Some(round) => round,
                None => return Ok(None),
            };
        }
    }

    /// Acknowledges each skipped commentator in ascending id order.
    fn ack_skipped<'a>(
        &self,
        studio: &'a Studio,
        mut round: RoundGuard<'a>,
    ) -> Result<Option<RoundGuard<'a>>, ProtocolViolation> {
        loop {
            let Some(mut ready) = studio.wait_until_clear(round, |_| true)? else {
                return Ok(None);
            };
            let Some(target) = ready.next_skipped()? else {
                return Ok(Some(ready));
            };
            debug!("acknowledging skip from {}", target);
            studio.broadcast();

            round = match studio.wait_until(ready, |r| r.ack_settled())? {
                Some(round) => round,
                None => return Ok(None),
            };
        }
    }

    fn transition(&mut self, next: CoordinatorState) {
        debug!("moderator {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentator::CommentatorAgent;
    use crate::config::SimulationConfig;
    use newsdesk_env::{CommentatorId, RandomSource, ScriptedRandom};
    use std::thread;
    use std::time::Duration;

    fn run_panel(config: SimulationConfig, draws: Vec<f64>) -> (Arc<Studio>, usize) {
        let studio = Studio::shared(config.with_pace(Duration::from_millis(5))).unwrap();
        let random: Arc<dyn RandomSource> = Arc::new(ScriptedRandom::new(draws).unwrap());

        let agents: Vec<_> = CommentatorId::all(studio.config().participants)
            .map(|id| {
                let agent = CommentatorAgent::new(id, Arc::clone(&studio), Arc::clone(&random));
                thread::spawn(move || agent.run())
            })
            .collect();

        let mut coordinator = TurnCoordinator::new(Arc::clone(&studio));
        let rounds = coordinator.run().unwrap();
        assert_eq!(coordinator.state(), CoordinatorState::GameOver);

        for agent in agents {
            assert_eq!(agent.join().unwrap(), Ok(rounds));
        }
        (studio, rounds)
    }

    #[test]
    fn test_all_answer_round_drains_in_arrival_order() {
        let config = SimulationConfig::new(3, 1, 1.0, 1.0, 0.0);
        let (studio, rounds) = run_panel(config, vec![0.0]);
        assert_eq!(rounds, 1);

        let events = studio.journal().events();
        let queued: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, PanelEvent::Queued { .. }))
            .filter_map(PanelEvent::commentator)
            .collect();
        let spoke: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, PanelEvent::Speaking { .. }))
            .filter_map(PanelEvent::commentator)
            .collect();
        assert_eq!(queued.len(), 3);
        assert_eq!(queued, spoke);
        assert_eq!(events.last(), Some(&PanelEvent::GameOver { rounds: 1 }));
    }

    #[test]
    fn test_silent_round_acknowledges_every_skip() {
        let config = SimulationConfig::new(1, 2, 0.0, 3.0, 0.0);
        let (studio, rounds) = run_panel(config, vec![0.5]);
        assert_eq!(rounds, 2);

        let events = studio.journal().events();
        assert_eq!(
            events,
            vec![
                PanelEvent::QuestionAsked { question: 1 },
                PanelEvent::Skipped {
                    commentator: CommentatorId(0),
                    question: 1
                },
                PanelEvent::SkipAcknowledged {
                    commentator: CommentatorId(0),
                    question: 1
                },
                PanelEvent::QuestionAsked { question: 2 },
                PanelEvent::Skipped {
                    commentator: CommentatorId(0),
                    question: 2
                },
                PanelEvent::SkipAcknowledged {
                    commentator: CommentatorId(0),
                    question: 2
                },
                PanelEvent::GameOver { rounds: 2 },
            ]
        );
    }

    #[test]
    fn test_next_round_waits_for_previous_acknowledgments() {
        let config = SimulationConfig::new(3, 3, 0.5, 1.0, 0.0);
        // Alternating draws give a mix of answers and skips
        let (studio, _) = run_panel(config, vec![0.1, 0.9, 0.2, 0.8]);

        let events = studio.journal().events();
        let mut current = 0;
        for event in &events {
            if let PanelEvent::QuestionAsked { question } = event {
                current = *question;
            } else if let Some(question) = event.question() {
                assert_eq!(question, current, "event {:?} leaked across rounds", event);
            }
        }
        assert_eq!(current, 3);
    }

    #[test]
    fn test_coordinator_stops_when_studio_aborts() {
        let config = SimulationConfig::new(1, 5, 0.0, 1.0, 0.0).with_pace(Duration::from_millis(5));
        let studio = Studio::shared(config).unwrap();
        let handle = {
            let studio = Arc::clone(&studio);
            thread::spawn(move || TurnCoordinator::new(studio).run())
        };

        thread::sleep(Duration::from_millis(20));
        studio.abort(&ProtocolViolation::LockPoisoned);
        assert_eq!(handle.join().unwrap(), Ok(0));
        assert!(studio.is_over());
    }
}
