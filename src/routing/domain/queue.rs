//! FIFO queue of requests waiting for a specialist.

use super::{RequesterId, SessionHandle, Subject};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A request that could not be matched when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Who asked for help.
    pub requester: RequesterId,
    /// Channel the requester is waiting in.
    pub session_handle: SessionHandle,
    /// What they asked about.
    pub subject: Subject,
}

impl PendingRequest {
    /// Creates a pending request.
    #[must_use]
    pub const fn new(requester: RequesterId, session_handle: SessionHandle, subject: Subject) -> Self {
        Self {
            requester,
            session_handle,
            subject,
        }
    }
}

/// Arrival-ordered collection of [`PendingRequest`]s.
///
/// Holds at most one entry per (requester, subject) pair. Subjects are not
/// prioritized against each other; only arrival order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequestQueue {
    entries: VecDeque<PendingRequest>,
}

impl PendingRequestQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` unless the same requester already waits for the same
    /// subject. Returns `true` when the entry was added.
    pub fn enqueue_unique(&mut self, entry: PendingRequest) -> bool {
        let duplicate = self
            .entries
            .iter()
            .any(|queued| queued.requester == entry.requester && queued.subject == entry.subject);
        if duplicate {
            return false;
        }
        self.entries.push_back(entry);
        true
    }

    /// Removes and returns the oldest entry satisfying `predicate`.
    ///
    /// Entries ahead of the match stay where they are.
    pub fn take_first_matching(
        &mut self,
        predicate: impl Fn(&PendingRequest) -> bool,
    ) -> Option<PendingRequest> {
        let position = self.entries.iter().position(predicate)?;
        self.entries.remove(position)
    }

    /// Drops every entry owned by `requester`, returning how many were removed.
    pub fn remove_requester(&mut self, requester: RequesterId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.requester != requester);
        before - self.entries.len()
    }

    /// Returns whether `requester` has any waiting entry.
    #[must_use]
    pub fn contains_requester(&self, requester: RequesterId) -> bool {
        self.entries.iter().any(|entry| entry.requester == requester)
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> + '_ {
        self.entries.iter()
    }

    /// Returns the number of waiting entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PendingRequest> for PendingRequestQueue {
    /// Collects entries in order, keeping only the first of any duplicates.
    fn from_iter<I: IntoIterator<Item = PendingRequest>>(iter: I) -> Self {
        let mut queue = Self::new();
        for entry in iter {
            queue.enqueue_unique(entry);
        }
        queue
    }
}
