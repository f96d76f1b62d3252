//! CommentatorAgent - one panelist's per-round protocol.
//!
//! Each round the agent:
//! 1. waits for an open question it has not decided on,
//! 2. samples whether to answer and records the decision,
//! 3. if queued: waits for the floor, speaks for a sampled duration
//!    (cut short if breaking news starts), then yields the floor,
//! 4. if skipped: waits for the moderator's acknowledgment and confirms it,
//! 5. waits out any breaking news before looking for the next question.
//!
//! Every step except the speech itself runs under the studio's round lock.

use crate::delay::{InterruptibleDelay, Wake};
use crate::error::ProtocolViolation;
use crate::journal::PanelEvent;
use crate::round::{Decision, RoundState};
use crate::studio::Studio;
use newsdesk_env::{CommentatorId, RandomSource};
use std::sync::{Arc, MutexGuard};
use std::time::Instant;
use tracing::{debug, error};

/// How a speech ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    Finished,
    CutShort,
}

/// A commentator thread's state and collaborators.
pub struct CommentatorAgent {
    id: CommentatorId,
    studio: Arc<Studio>,
    random: Arc<dyn RandomSource>,
}

impl CommentatorAgent {
    pub fn new(id: CommentatorId, studio: Arc<Studio>, random: Arc<dyn RandomSource>) -> Self {
        Self { id, studio, random }
    }

    pub fn id(&self) -> CommentatorId {
        self.id
    }

    /// Runs rounds until the game ends. Returns the number of rounds taken part in.
    ///
    /// A protocol violation stops the whole studio before it is returned.
    pub fn run(&self) -> Result<usize, ProtocolViolation> {
        let result = self.run_rounds();
        if let Err(violation) = &result {
            error!("commentator {} hit a protocol violation: {}", self.id, violation);
            self.studio.abort(violation);
        }
        result
    }

    fn run_rounds(&self) -> Result<usize, ProtocolViolation> {
        let mut rounds = 0;
        while self.take_part_in_round()? {
            rounds += 1;
        }
        debug!("commentator {} leaving after {} rounds", self.id, rounds);
        Ok(rounds)
    }

    /// Plays one round. Returns false once the game is over.
    fn take_part_in_round(&self) -> Result<bool, ProtocolViolation> {
        let id = self.id;
        let studio = &self.studio;

        let round = studio.lock_round()?;
        let Some(mut round) = studio.wait_until(round, |r| r.awaiting_decision(id))? else {
            return Ok(false);
        };

        let question = round.begin_decision(id)?;
        let answer = self.random.next_unit() < studio.config().answer_probability;
        let outcome = round.record_decision(id, answer)?;

        match outcome.decision {
            Decision::Queued { position } => studio.record(PanelEvent::Queued {
                commentator: id,
                question,
                position,
            }),
            Decision::Skipped => studio.record(PanelEvent::Skipped {
                commentator: id,
                question,
            }),
        }
        if outcome.last {
            debug!("commentator {} closed the decision phase of question {}", id, question);
            studio.broadcast();
        }

        let round = match outcome.decision {
            Decision::Queued { .. } => self.speak(round, question)?,
            Decision::Skipped => self.await_acknowledgment(round, question)?,
        };
        let Some(round) = round else {
            return Ok(false);
        };

        let Some(round) = studio.wait_until_clear(round, |_| true)? else {
            return Ok(false);
        };
        drop(round);
        Ok(true)
    }

    /// Waits for the floor, speaks, and yields the floor.
    fn speak<'a>(
        &'a self,
        round: MutexGuard<'a, RoundState>,
        question: usize,
    ) -> Result<Option<MutexGuard<'a, RoundState>>, ProtocolViolation> {
        let id = self.id;
        let studio = &self.studio;

        let Some(mut round) = studio.wait_until_clear(round, |r| r.has_floor(id))? else {
            return Ok(None);
        };
        round.begin_speaking(id)?;

        let seconds = studio.config().speak_secs(self.random.next_unit());
        studio.record(PanelEvent::Speaking {
            commentator: id,
            question,
            seconds,
        });

        // Arm before checking the flag: an activation either shows up in
        // the flag or raises after the arm, never neither.
        let delay = InterruptibleDelay::arm(studio.news().interrupt());
        drop(round);
        let outcome = self.hold_floor(delay, question, seconds);
        debug!("commentator {} yields the floor: {:?}", id, outcome);

        let mut round = studio.lock_round()?;
        round.finish_speaking(id)?;
        studio.broadcast();
        Ok(Some(round))
    }

    /// Runs the speech delay without the round lock and records its outcome.
    fn hold_floor(&self, delay: InterruptibleDelay<'_>, question: usize, seconds: f64) -> SpeechOutcome {
        let started = Instant::now();
        let wake = if self.studio.news().is_active() {
            Wake::Interrupted
        } else {
            delay.wait(self.studio.config().scaled(seconds))
        };
        let spoke_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = speech_outcome(wake);
        let event = match outcome {
            SpeechOutcome::Finished => PanelEvent::Finished {
                commentator: self.id,
                question,
                spoke_ms,
            },
            SpeechOutcome::CutShort => PanelEvent::CutShort {
                commentator: self.id,
                question,
                spoke_ms,
            },
        };
        self.studio.record(event);
        outcome
    }

    /// Waits to be acknowledged as skipped and confirms it.
    fn await_acknowledgment<'a>(
        &'a self,
        round: MutexGuard<'a, RoundState>,
        question: usize,
    ) -> Result<Option<MutexGuard<'a, RoundState>>, ProtocolViolation> {
        let id = self.id;
        let studio = &self.studio;

        let Some(mut round) = studio.wait_until(round, |r| r.is_ack_target(id))? else {
            return Ok(None);
        };
        round.acknowledge(id)?;
        studio.record(PanelEvent::SkipAcknowledged {
            commentator: id,
            question,
        });
        studio.broadcast();
        Ok(Some(round))
    }
}

/// Maps a speech delay's wake reason to what the audience saw.
pub fn speech_outcome(wake: Wake) -> SpeechOutcome {
    match wake {
        Wake::Elapsed => SpeechOutcome::Finished,
        Wake::Interrupted | Wake::Closed => SpeechOutcome::CutShort,
    }
}
