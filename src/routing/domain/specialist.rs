//! Specialist entity and availability state.

use super::{SpecialistId, Subject, SubjectSet};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a specialist can take a new match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistState {
    /// Available for matching.
    Idle,
    /// Engaged with at least one requester.
    Busy,
}

impl SpecialistState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for SpecialistState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered specialist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialist {
    id: SpecialistId,
    capabilities: SubjectSet,
    state: SpecialistState,
    last_released_at: Option<DateTime<Utc>>,
    registration_seq: u64,
}

impl Specialist {
    /// Creates an idle specialist that has never been released.
    #[must_use]
    pub const fn new(id: SpecialistId, capabilities: SubjectSet, registration_seq: u64) -> Self {
        Self {
            id,
            capabilities,
            state: SpecialistState::Idle,
            last_released_at: None,
            registration_seq,
        }
    }

    /// Returns the specialist identifier.
    #[must_use]
    pub const fn id(&self) -> SpecialistId {
        self.id
    }

    /// Returns the subjects this specialist handles.
    #[must_use]
    pub const fn capabilities(&self) -> &SubjectSet {
        &self.capabilities
    }

    /// Returns whether the specialist handles `subject`.
    #[must_use]
    pub fn can_handle(&self, subject: Subject) -> bool {
        self.capabilities.contains(subject)
    }

    /// Returns the availability state.
    #[must_use]
    pub const fn state(&self) -> SpecialistState {
        self.state
    }

    /// Returns whether the specialist is busy.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.state, SpecialistState::Busy)
    }

    /// Returns when the specialist last went from busy to idle.
    ///
    /// `None` means the specialist has never been released and therefore
    /// ranks ahead of everyone who has.
    #[must_use]
    pub const fn last_released_at(&self) -> Option<DateTime<Utc>> {
        self.last_released_at
    }

    /// Returns the position of this specialist in registration order.
    #[must_use]
    pub const fn registration_seq(&self) -> u64 {
        self.registration_seq
    }

    /// Replaces the capability set and returns the previous one.
    pub(crate) fn replace_capabilities(&mut self, capabilities: SubjectSet) -> SubjectSet {
        std::mem::replace(&mut self.capabilities, capabilities)
    }

    /// Drops a busy flag without counting it as a release.
    pub(crate) const fn clear_stale_reservation(&mut self) {
        self.state = SpecialistState::Idle;
    }

    /// Marks the specialist busy. Idempotent.
    pub fn mark_busy(&mut self) {
        self.state = SpecialistState::Busy;
    }

    /// Marks the specialist idle.
    ///
    /// Only the busy to idle transition stamps `last_released_at`; calling
    /// this on an idle specialist changes nothing. Stamps are strictly
    /// increasing per specialist even if the clock reports the same instant
    /// twice.
    pub fn mark_idle(&mut self, clock: &impl Clock) {
        if !self.is_busy() {
            return;
        }
        let now = clock.utc();
        let stamp = match self.last_released_at {
            Some(previous) if now <= previous => previous + TimeDelta::nanoseconds(1),
            _ => now,
        };
        self.state = SpecialistState::Idle;
        self.last_released_at = Some(stamp);
    }
}
