//! Shared round state: the record every phase transition goes through.
//!
//! `RoundState` holds no locks and never blocks. The threaded agents wrap it
//! in the studio's round lock; the lockstep harness drives it directly. Both
//! therefore share one definition of which transition is legal when.
//!
//! # Round lifecycle
//!
//! ```text
//!  Moderator ──announce()──► Commentators
//!      ▲                        │ begin_decision / record_decision  (×N)
//!      │                        ▼
//!      │                  grant_floor ─► begin_speaking ─► finish_speaking  (per queued id, FIFO)
//!      │                        │
//!      │                  next_skipped ─► acknowledge   (per skipped id, ascending)
//!      │                        │
//!      └──────close_round()─────┘
//! ```

use crate::error::ProtocolViolation;
use crate::ready_queue::ReadyQueue;
use newsdesk_env::CommentatorId;
use serde::{Deserialize, Serialize};

/// Which side of the panel may act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOwner {
    Moderator,
    Commentators,
}

/// Per-commentator phase marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the next question
    Idle,
    /// Sampling whether to answer
    Deciding,
    /// In the ready queue, waiting for the floor
    Queued,
    /// Declined; waiting for the moderator's acknowledgment
    Skipped,
    /// Holding the floor
    Speaking,
    /// Skip acknowledged; done for this round
    Acknowledged,
}

/// A commentator's choice for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Joined the ready queue at the given zero-based position
    Queued { position: usize },
    Skipped,
}

/// Result of recording a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub decision: Decision,
    /// True for the decision that brought `pending_decisions` to zero
    pub last: bool,
}

/// State of the current round, shared by the moderator and all commentators.
#[derive(Debug, Clone)]
pub struct RoundState {
    participants: usize,
    question: usize,
    turn_owner: TurnOwner,
    pending_decisions: usize,
    ready_queue: ReadyQueue,
    phases: Vec<Phase>,
    /// Question each commentator last decided on (0 = none)
    decided: Vec<usize>,
    /// Commentator currently granted the floor
    floor: Option<CommentatorId>,
    /// Skipped commentator currently being acknowledged
    ack_target: Option<CommentatorId>,
    game_over: bool,
}

impl RoundState {
    /// Creates the state for a panel of `participants` commentators.
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            question: 0,
            turn_owner: TurnOwner::Moderator,
            pending_decisions: 0,
            ready_queue: ReadyQueue::new(participants),
            phases: vec![Phase::Idle; participants],
            decided: vec![0; participants],
            floor: None,
            ack_target: None,
            game_over: false,
        }
    }

    // =========================================================================
    // Moderator transitions
    // =========================================================================

    /// Opens the next question and hands the turn to the commentators.
    ///
    /// Returns the new question number (1-based).
    pub fn announce(&mut self) -> Result<usize, ProtocolViolation> {
        self.expect_turn(TurnOwner::Moderator)?;
        let outstanding = self.phases.iter().filter(|p| **p != Phase::Idle).count();
        if outstanding > 0 {
            return Err(ProtocolViolation::RoundIncomplete {
                question: self.question,
                outstanding,
            });
        }

        self.question += 1;
        self.turn_owner = TurnOwner::Commentators;
        self.pending_decisions = self.participants;
        self.ready_queue.clear();
        Ok(self.question)
    }

    /// Pops the next queued commentator and grants it the floor.
    ///
    /// Returns `None` once the queue is drained.
    pub fn grant_floor(&mut self) -> Result<Option<CommentatorId>, ProtocolViolation> {
        self.expect_decisions_complete()?;
        if let Some(holder) = self.floor {
            return Err(ProtocolViolation::FloorOccupied(holder));
        }

        let Some(id) = self.ready_queue.pop() else {
            return Ok(None);
        };
        self.expect_phase(id, Phase::Queued)?;
        self.floor = Some(id);
        Ok(Some(id))
    }

    /// Selects the lowest-id skipped commentator for acknowledgment.
    ///
    /// Returns `None` once every skipped commentator has been acknowledged.
    pub fn next_skipped(&mut self) -> Result<Option<CommentatorId>, ProtocolViolation> {
        self.expect_decisions_complete()?;
        if let Some(holder) = self.floor {
            return Err(ProtocolViolation::FloorOccupied(holder));
        }
        if let Some(target) = self.ack_target {
            return Err(ProtocolViolation::NotAwaitingAck(target));
        }

        let next = self.skipped().into_iter().next();
        self.ack_target = next;
        Ok(next)
    }

    /// Ends the round and returns the turn to the moderator.
    pub fn close_round(&mut self) -> Result<(), ProtocolViolation> {
        self.expect_turn(TurnOwner::Commentators)?;
        let outstanding = self.pending_decisions
            + self.ready_queue.len()
            + self
                .phases
                .iter()
                .filter(|p| !matches!(p, Phase::Idle | Phase::Acknowledged))
                .count();
        if outstanding > 0 || self.floor.is_some() || self.ack_target.is_some() {
            return Err(ProtocolViolation::RoundIncomplete {
                question: self.question,
                outstanding: outstanding.max(1),
            });
        }

        for phase in &mut self.phases {
            *phase = Phase::Idle;
        }
        self.turn_owner = TurnOwner::Moderator;
        Ok(())
    }

    /// Marks the simulation as finished.
    pub fn finish_game(&mut self) {
        self.game_over = true;
    }

    // =========================================================================
    // Commentator transitions
    // =========================================================================

    /// Moves a commentator from Idle to Deciding on the open question.
    pub fn begin_decision(&mut self, id: CommentatorId) -> Result<usize, ProtocolViolation> {
        self.expect_turn(TurnOwner::Commentators)?;
        let index = self.index(id)?;
        if self.decided[index] == self.question {
            return Err(ProtocolViolation::AlreadyDecided {
                id,
                question: self.question,
            });
        }
        self.expect_phase(id, Phase::Idle)?;

        self.phases[index] = Phase::Deciding;
        Ok(self.question)
    }

    /// Records a commentator's decision and counts it against the round.
    ///
    /// Decrement-and-check is one step, so exactly one caller sees `last`.
    pub fn record_decision(
        &mut self,
        id: CommentatorId,
        answer: bool,
    ) -> Result<DecisionOutcome, ProtocolViolation> {
        self.expect_phase(id, Phase::Deciding)?;
        if self.pending_decisions == 0 {
            return Err(ProtocolViolation::NoPendingDecisions);
        }
        let index = self.index(id)?;

        let decision = if answer {
            let position = self.ready_queue.push(id)?;
            self.phases[index] = Phase::Queued;
            Decision::Queued { position }
        } else {
            self.phases[index] = Phase::Skipped;
            Decision::Skipped
        };
        self.decided[index] = self.question;
        self.pending_decisions -= 1;

        Ok(DecisionOutcome {
            decision,
            last: self.pending_decisions == 0,
        })
    }

    /// The floor holder starts its speech.
    pub fn begin_speaking(&mut self, id: CommentatorId) -> Result<(), ProtocolViolation> {
        if self.floor != Some(id) {
            return Err(ProtocolViolation::NotOnFloor(id));
        }
        self.expect_phase(id, Phase::Queued)?;
        let index = self.index(id)?;
        self.phases[index] = Phase::Speaking;
        Ok(())
    }

    /// The floor holder yields the floor and returns to Idle.
    pub fn finish_speaking(&mut self, id: CommentatorId) -> Result<(), ProtocolViolation> {
        if self.floor != Some(id) {
            return Err(ProtocolViolation::NotOnFloor(id));
        }
        self.expect_phase(id, Phase::Speaking)?;
        let index = self.index(id)?;
        self.phases[index] = Phase::Idle;
        self.floor = None;
        Ok(())
    }

    /// A skipped commentator confirms the moderator's acknowledgment.
    pub fn acknowledge(&mut self, id: CommentatorId) -> Result<(), ProtocolViolation> {
        if self.ack_target != Some(id) {
            return Err(ProtocolViolation::NotAwaitingAck(id));
        }
        self.expect_phase(id, Phase::Skipped)?;
        let index = self.index(id)?;
        self.phases[index] = Phase::Acknowledged;
        self.ack_target = None;
        Ok(())
    }

    // =========================================================================
    // Wait predicates
    // =========================================================================

    /// True when `id` has an open question it has not decided on yet.
    pub fn awaiting_decision(&self, id: CommentatorId) -> bool {
        self.turn_owner == TurnOwner::Commentators
            && self
                .decided
                .get(id.index())
                .is_some_and(|question| *question < self.question)
    }

    /// True when every commentator has decided on the open question.
    pub fn decisions_complete(&self) -> bool {
        self.turn_owner == TurnOwner::Commentators && self.pending_decisions == 0
    }

    /// True when `id` has been granted the floor and has not started yet.
    pub fn has_floor(&self, id: CommentatorId) -> bool {
        self.floor == Some(id) && self.phase(id) == Some(Phase::Queued)
    }

    /// True when no commentator holds the floor.
    pub fn floor_open(&self) -> bool {
        self.floor.is_none()
    }

    /// True when `id` is the skipped commentator being acknowledged.
    pub fn is_ack_target(&self, id: CommentatorId) -> bool {
        self.ack_target == Some(id)
    }

    /// True when no acknowledgment is outstanding.
    pub fn ack_settled(&self) -> bool {
        self.ack_target.is_none()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn participants(&self) -> usize {
        self.participants
    }

    /// Current question number; 0 before the first announcement.
    pub fn question(&self) -> usize {
        self.question
    }

    pub fn turn_owner(&self) -> TurnOwner {
        self.turn_owner
    }

    pub fn pending_decisions(&self) -> usize {
        self.pending_decisions
    }

    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.ready_queue
    }

    pub fn phase(&self, id: CommentatorId) -> Option<Phase> {
        self.phases.get(id.index()).copied()
    }

    pub fn floor(&self) -> Option<CommentatorId> {
        self.floor
    }

    /// Commentators still waiting for a skip acknowledgment, ascending.
    pub fn skipped(&self) -> Vec<CommentatorId> {
        CommentatorId::all(self.participants)
            .filter(|id| self.phase(*id) == Some(Phase::Skipped))
            .collect()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    // =========================================================================
    // Guards
    // =========================================================================

    fn index(&self, id: CommentatorId) -> Result<usize, ProtocolViolation> {
        if id.index() < self.participants {
            Ok(id.index())
        } else {
            Err(ProtocolViolation::UnknownCommentator(id))
        }
    }

    fn expect_turn(&self, expected: TurnOwner) -> Result<(), ProtocolViolation> {
        if self.turn_owner == expected {
            Ok(())
        } else {
            Err(ProtocolViolation::WrongTurn {
                expected,
                actual: self.turn_owner,
            })
        }
    }

    fn expect_phase(&self, id: CommentatorId, expected: Phase) -> Result<(), ProtocolViolation> {
        let actual = self.phases[self.index(id)?];
        if actual == expected {
            Ok(())
        } else {
            Err(ProtocolViolation::UnexpectedPhase {
                id,
                expected,
                actual,
            })
        }
    }

    fn expect_decisions_complete(&self) -> Result<(), ProtocolViolation> {
        self.expect_turn(TurnOwner::Commentators)?;
        if self.pending_decisions > 0 {
            return Err(ProtocolViolation::DecisionsPending(self.pending_decisions));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CommentatorId = CommentatorId(0);
    const B: CommentatorId = CommentatorId(1);
    const C: CommentatorId = CommentatorId(2);

    fn decide(state: &mut RoundState, id: CommentatorId, answer: bool) -> DecisionOutcome {
        state.begin_decision(id).unwrap();
        state.record_decision(id, answer).unwrap()
    }

    #[test]
    fn test_announce_resets_round() {
        let mut state = RoundState::new(3);
        assert_eq!(state.question(), 0);

        assert_eq!(state.announce(), Ok(1));
        assert_eq!(state.turn_owner(), TurnOwner::Commentators);
        assert_eq!(state.pending_decisions(), 3);
        assert!(state.ready_queue().is_empty());
        assert!(state.awaiting_decision(A));
    }

    #[test]
    fn test_announce_requires_moderator_turn() {
        let mut state = RoundState::new(1);
        state.announce().unwrap();

        assert_eq!(
            state.announce(),
            Err(ProtocolViolation::WrongTurn {
                expected: TurnOwner::Moderator,
                actual: TurnOwner::Commentators,
            })
        );
    }

    #[test]
    fn test_only_last_decision_reports_last() {
        let mut state = RoundState::new(3);
        state.announce().unwrap();

        assert!(!decide(&mut state, B, true).last);
        assert!(!decide(&mut state, A, false).last);
        let outcome = decide(&mut state, C, true);

        assert!(outcome.last);
        assert_eq!(outcome.decision, Decision::Queued { position: 1 });
        assert!(state.decisions_complete());
    }

    #[test]
    fn test_queue_and_skipped_partition_panel() {
        let mut state = RoundState::new(3);
        state.announce().unwrap();
        decide(&mut state, C, false);
        decide(&mut state, A, true);
        decide(&mut state, B, false);

        let queued: Vec<CommentatorId> = state.ready_queue().iter().copied().collect();
        let skipped = state.skipped();
        assert_eq!(queued, vec![A]);
        assert_eq!(skipped, vec![B, C]);
        assert_eq!(queued.len() + skipped.len(), state.participants());
    }

    #[test]
    fn test_decision_twice_is_violation() {
        let mut state = RoundState::new(2);
        state.announce().unwrap();
        decide(&mut state, A, true);

        assert_eq!(
            state.begin_decision(A),
            Err(ProtocolViolation::AlreadyDecided { id: A, question: 1 })
        );
        assert!(!state.awaiting_decision(A));
        assert!(state.awaiting_decision(B));
    }

    #[test]
    fn test_record_without_begin_is_violation() {
        let mut state = RoundState::new(1);
        state.announce().unwrap();

        assert!(matches!(
            state.record_decision(A, true),
            Err(ProtocolViolation::UnexpectedPhase { expected: Phase::Deciding, .. })
        ));
    }

    #[test]
    fn test_unknown_commentator_is_violation() {
        let mut state = RoundState::new(1);
        state.announce().unwrap();

        assert_eq!(
            state.begin_decision(CommentatorId(5)),
            Err(ProtocolViolation::UnknownCommentator(CommentatorId(5)))
        );
    }

    #[test]
    fn test_floor_follows_decision_order() {
        let mut state = RoundState::new(3);
        state.announce().unwrap();
        decide(&mut state, C, true);
        decide(&mut state, A, true);
        decide(&mut state, B, true);

        let mut order = Vec::new();
        while let Some(id) = state.grant_floor().unwrap() {
            assert!(state.has_floor(id));
            state.begin_speaking(id).unwrap();
            state.finish_speaking(id).unwrap();
            order.push(id);
        }

        assert_eq!(order, vec![C, A, B]);
        assert!(state.floor_open());
    }

    #[test]
    fn test_floor_held_blocks_next_grant() {
        let mut state = RoundState::new(2);
        state.announce().unwrap();
        decide(&mut state, A, true);
        decide(&mut state, B, true);

        assert_eq!(state.grant_floor(), Ok(Some(A)));
        assert_eq!(state.grant_floor(), Err(ProtocolViolation::FloorOccupied(A)));
        assert_eq!(state.begin_speaking(B), Err(ProtocolViolation::NotOnFloor(B)));
    }

    #[test]
    fn test_grant_before_decisions_complete_is_violation() {
        let mut state = RoundState::new(2);
        state.announce().unwrap();
        decide(&mut state, A, true);

        assert_eq!(state.grant_floor(), Err(ProtocolViolation::DecisionsPending(1)));
    }

    #[test]
    fn test_skipped_acknowledged_in_ascending_order() {
        let mut state = RoundState::new(3);
        state.announce().unwrap();
        decide(&mut state, C, false);
        decide(&mut state, B, true);
        decide(&mut state, A, false);

        assert_eq!(state.grant_floor(), Ok(Some(B)));
        state.begin_speaking(B).unwrap();
        state.finish_speaking(B).unwrap();
        assert_eq!(state.grant_floor(), Ok(None));

        let mut acked = Vec::new();
        while let Some(id) = state.next_skipped().unwrap() {
            assert!(state.is_ack_target(id));
            state.acknowledge(id).unwrap();
            assert!(state.ack_settled());
            acked.push(id);
        }
        assert_eq!(acked, vec![A, C]);

        state.close_round().unwrap();
        assert_eq!(state.turn_owner(), TurnOwner::Moderator);
        assert_eq!(state.phase(A), Some(Phase::Idle));
    }

    #[test]
    fn test_acknowledge_wrong_target_is_violation() {
        let mut state = RoundState::new(2);
        state.announce().unwrap();
        decide(&mut state, A, false);
        decide(&mut state, B, false);

        assert_eq!(state.next_skipped(), Ok(Some(A)));
        assert_eq!(state.acknowledge(B), Err(ProtocolViolation::NotAwaitingAck(B)));
        assert_eq!(state.next_skipped(), Err(ProtocolViolation::NotAwaitingAck(A)));
    }

    #[test]
    fn test_close_round_with_outstanding_work_is_violation() {
        let mut state = RoundState::new(2);
        state.announce().unwrap();
        decide(&mut state, A, false);
        decide(&mut state, B, true);

        assert!(matches!(
            state.close_round(),
            Err(ProtocolViolation::RoundIncomplete { question: 1, .. })
        ));
    }

    #[test]
    fn test_silent_round_completes_with_empty_queue() {
        let mut state = RoundState::new(1);
        state.announce().unwrap();
        let outcome = decide(&mut state, A, false);

        assert_eq!(outcome.decision, Decision::Skipped);
        assert_eq!(state.grant_floor(), Ok(None));
        assert_eq!(state.next_skipped(), Ok(Some(A)));
        state.acknowledge(A).unwrap();
        assert_eq!(state.next_skipped(), Ok(None));
        state.close_round().unwrap();

        assert!(state.ready_queue().is_empty());
        assert_eq!(state.announce(), Ok(2));
    }
}
