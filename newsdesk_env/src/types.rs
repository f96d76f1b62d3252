//! Common types for the Newsdesk environment abstraction.

use serde::{Deserialize, Serialize};

/// Identifier of a commentator on the panel.
///
/// Ids are dense indices `0..N`, fixed when the agent is created. They order
/// the skip-acknowledgment pass, so they derive `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentatorId(pub usize);

impl CommentatorId {
    /// Returns the index of this commentator.
    pub fn index(&self) -> usize {
        self.0
    }

    /// Returns every id of a panel of `count` commentators, ascending.
    pub fn all(count: usize) -> impl Iterator<Item = CommentatorId> {
        (0..count).map(CommentatorId)
    }
}

impl From<usize> for CommentatorId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for CommentatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
