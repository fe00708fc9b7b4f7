//! Results of matching operations.

use super::{RequesterId, SessionHandle, SpecialistId, Subject};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a request was not matched immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferralReason {
    /// No idle capable specialist; the request waits in the queue.
    Queued,
    /// The availability gate is closed.
    OutOfHours,
    /// The requester is already being helped.
    AlreadyAssigned,
}

impl DeferralReason {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::OutOfHours => "out_of_hours",
            Self::AlreadyAssigned => "already_assigned",
        }
    }
}

impl fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a match request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    /// The specialist was assigned and is now busy.
    Matched(SpecialistId),
    /// No idle capable specialist; the request is queued.
    Queued,
    /// Nothing changed; see the reason.
    Deferred(DeferralReason),
}

impl MatchOutcome {
    /// Returns the deferral reason for every outcome other than a match.
    #[must_use]
    pub const fn deferral_reason(self) -> Option<DeferralReason> {
        match self {
            Self::Matched(_) => None,
            Self::Queued => Some(DeferralReason::Queued),
            Self::Deferred(reason) => Some(reason),
        }
    }

    /// Returns the matched specialist, if any.
    #[must_use]
    pub const fn specialist(self) -> Option<SpecialistId> {
        match self {
            Self::Matched(id) => Some(id),
            Self::Queued | Self::Deferred(_) => None,
        }
    }
}

/// A committed pairing of a specialist with a requester session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Assignment {
    /// The requester being helped.
    pub requester: RequesterId,
    /// Channel the requester is in.
    pub session_handle: SessionHandle,
    /// The specialist now engaged.
    pub specialist: SpecialistId,
    /// Subject that drove the match; `None` for direct invitations.
    pub subject: Option<Subject>,
}

/// What a reclaim released.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReclaimReport {
    /// Specialists returned to idle.
    pub released: Vec<SpecialistId>,
    /// Number of pending requests dropped from the queue.
    pub dropped_requests: usize,
}
