//! Requester session state.

use super::{RequesterId, SessionHandle, SpecialistId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where a requester stands in the matching lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Neither waiting nor being helped.
    Unassigned,
    /// Waiting in the pending-request queue.
    Queued,
    /// At least one specialist is engaged.
    Assigned,
}

impl SessionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Queued => "queued",
            Self::Assigned => "assigned",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-requester state: the host channel and the specialists helping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterSession {
    requester: RequesterId,
    session_handle: SessionHandle,
    assigned_specialists: BTreeSet<SpecialistId>,
}

impl RequesterSession {
    /// Creates a session with nobody assigned.
    #[must_use]
    pub const fn new(requester: RequesterId, session_handle: SessionHandle) -> Self {
        Self {
            requester,
            session_handle,
            assigned_specialists: BTreeSet::new(),
        }
    }

    /// Returns the requester identifier.
    #[must_use]
    pub const fn requester(&self) -> RequesterId {
        self.requester
    }

    /// Returns the host channel handle.
    #[must_use]
    pub const fn session_handle(&self) -> SessionHandle {
        self.session_handle
    }

    /// Points the session at a different host channel.
    pub const fn set_session_handle(&mut self, session_handle: SessionHandle) {
        self.session_handle = session_handle;
    }

    /// Returns the specialists currently engaged.
    #[must_use]
    pub const fn assigned_specialists(&self) -> &BTreeSet<SpecialistId> {
        &self.assigned_specialists
    }

    /// Returns whether any specialist is engaged.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        !self.assigned_specialists.is_empty()
    }

    /// Returns whether `specialist` is engaged with this session.
    #[must_use]
    pub fn has_specialist(&self, specialist: SpecialistId) -> bool {
        self.assigned_specialists.contains(&specialist)
    }

    pub(crate) fn assign(&mut self, specialist: SpecialistId) -> bool {
        self.assigned_specialists.insert(specialist)
    }

    pub(crate) fn release(&mut self, specialist: SpecialistId) -> bool {
        self.assigned_specialists.remove(&specialist)
    }

    pub(crate) fn release_all(&mut self) -> Vec<SpecialistId> {
        std::mem::take(&mut self.assigned_specialists)
            .into_iter()
            .collect()
    }
}
