//! Lockstep harness - drives `RoundState` on one thread.
//!
//! The threaded run interleaves decisions however the scheduler likes. The
//! harness instead takes the decision order as input, so a given order and
//! random script always produce the same event sequence. Speeches complete
//! instantly and are recorded with the length they would have taken.

use newsdesk_core::{Decision, PanelEvent, ProtocolViolation, RoundState, SimulationConfig};
use newsdesk_env::{CommentatorId, RandomSource};
use tracing::debug;

/// Single-threaded driver over the round state machine.
pub struct LockstepHarness<R: RandomSource> {
    config: SimulationConfig,
    round: RoundState,
    random: R,
    events: Vec<PanelEvent>,
}

impl<R: RandomSource> LockstepHarness<R> {
    pub fn new(config: SimulationConfig, random: R) -> Self {
        let round = RoundState::new(config.participants);
        Self {
            config,
            round,
            random,
            events: Vec::new(),
        }
    }

    /// Plays every question with commentators deciding in ascending id order.
    pub fn run(self) -> Result<Vec<PanelEvent>, ProtocolViolation> {
        let order: Vec<_> = CommentatorId::all(self.config.participants).collect();
        let orders = vec![order; self.config.questions];
        self.run_with_orders(&orders)
    }

    /// Plays every question, round `i` using `orders[i]` as its decision order.
    ///
    /// Rounds past the end of `orders` fall back to ascending id order.
    pub fn run_with_orders(
        mut self,
        orders: &[Vec<CommentatorId>],
    ) -> Result<Vec<PanelEvent>, ProtocolViolation> {
        let fallback: Vec<_> = CommentatorId::all(self.config.participants).collect();

        for question in 0..self.config.questions {
            let order = orders.get(question).unwrap_or(&fallback);
            self.play_round(order)?;
        }
        self.round.finish_game();
        self.events.push(PanelEvent::GameOver {
            rounds: self.round.question(),
        });
        Ok(self.events)
    }

    /// Plays one round with the given decision order.
    pub fn play_round(&mut self, order: &[CommentatorId]) -> Result<(), ProtocolViolation> {
        let question = self.round.announce()?;
        self.events.push(PanelEvent::QuestionAsked { question });

        for &commentator in order {
            self.round.begin_decision(commentator)?;
            let answer = self.random.next_unit() < self.config.answer_probability;
            let outcome = self.round.record_decision(commentator, answer)?;
            self.events.push(match outcome.decision {
                Decision::Queued { position } => PanelEvent::Queued {
                    commentator,
                    question,
                    position,
                },
                Decision::Skipped => PanelEvent::Skipped {
                    commentator,
                    question,
                },
            });
        }

        while let Some(commentator) = self.round.grant_floor()? {
            self.round.begin_speaking(commentator)?;
            let seconds = self.config.speak_secs(self.random.next_unit());
            self.events.push(PanelEvent::Speaking {
                commentator,
                question,
                seconds,
            });
            self.round.finish_speaking(commentator)?;

            let spoke_ms = u64::try_from(self.config.scaled(seconds).as_millis()).unwrap_or(u64::MAX);
            self.events.push(PanelEvent::Finished {
                commentator,
                question,
                spoke_ms,
            });
        }

        while let Some(commentator) = self.round.next_skipped()? {
            self.round.acknowledge(commentator)?;
            self.events.push(PanelEvent::SkipAcknowledged {
                commentator,
                question,
            });
        }

        self.round.close_round()?;
        debug!("lockstep question {} closed", question);
        Ok(())
    }

    pub fn events(&self) -> &[PanelEvent] {
        &self.events
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }
}
