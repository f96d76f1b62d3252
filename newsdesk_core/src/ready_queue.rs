//! FIFO of commentators waiting to speak.

use crate::error::ProtocolViolation;
use newsdesk_env::CommentatorId;
use std::collections::VecDeque;

/// Commentators that chose to answer, in decision-arrival order.
///
/// Holds at most one entry per participant.
#[derive(Debug, Clone)]
pub struct ReadyQueue {
    entries: VecDeque<CommentatorId>,
    capacity: usize,
}

impl ReadyQueue {
    /// Creates an empty queue for a panel of `capacity` commentators.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a commentator and returns its zero-based position.
    pub fn push(&mut self, id: CommentatorId) -> Result<usize, ProtocolViolation> {
        if self.entries.contains(&id) {
            return Err(ProtocolViolation::AlreadyQueued(id));
        }
        if self.entries.len() >= self.capacity {
            return Err(ProtocolViolation::QueueFull {
                capacity: self.capacity,
            });
        }
        self.entries.push_back(id);
        Ok(self.entries.len() - 1)
    }

    /// Removes the commentator that has waited longest.
    pub fn pop(&mut self) -> Option<CommentatorId> {
        self.entries.pop_front()
    }

    pub fn contains(&self, id: CommentatorId) -> bool {
        self.entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates front to back.
    pub fn iter(&self) -> impl Iterator<Item = &CommentatorId> {
        self.entries.iter()
    }
}
