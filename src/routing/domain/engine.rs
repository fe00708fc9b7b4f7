//! Engine state aggregate: registry, sessions, and the pending queue.
//!
//! All matching rules live here as synchronous operations so a single lock
//! around an [`EngineState`] is enough to serialize them. Nothing in this
//! module performs I/O.

use super::{
    Assignment, DeferralReason, EngineSnapshot, MatchOutcome, PendingRequest,
    PendingRequestQueue, ReclaimReport, RequesterId, RequesterSession, RoutingError,
    SNAPSHOT_FORMAT_VERSION, SessionHandle, SessionStatus, Specialist, SpecialistId,
    SpecialistRegistry, Subject, SubjectSet, UpsertOutcome,
};
use mockable::Clock;
use std::collections::{HashMap, HashSet};

/// Counts of inconsistencies repaired while restoring a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    /// Session assignments that named unknown specialists.
    pub dangling_assignments: usize,
    /// Busy flags with no session holding the specialist.
    pub stale_reservations: usize,
    /// Queue entries for requesters without a session or already assigned.
    pub orphaned_requests: usize,
}

impl RestoreReport {
    /// Returns whether the snapshot needed no repair.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.dangling_assignments == 0 && self.stale_reservations == 0 && self.orphaned_requests == 0
    }
}

/// Process-wide matching state.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    registry: SpecialistRegistry,
    sessions: HashMap<RequesterId, RequesterSession>,
    queue: PendingRequestQueue,
}

impl EngineState {
    /// Creates an empty engine state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the specialist registry.
    #[must_use]
    pub const fn registry(&self) -> &SpecialistRegistry {
        &self.registry
    }

    /// Returns the pending-request queue.
    #[must_use]
    pub const fn queue(&self) -> &PendingRequestQueue {
        &self.queue
    }

    /// Returns the session for `requester`, if one exists.
    #[must_use]
    pub fn session(&self, requester: RequesterId) -> Option<&RequesterSession> {
        self.sessions.get(&requester)
    }

    /// Derives the lifecycle status of `requester`.
    #[must_use]
    pub fn session_status(&self, requester: RequesterId) -> SessionStatus {
        if self.sessions.get(&requester).is_some_and(RequesterSession::is_assigned) {
            SessionStatus::Assigned
        } else if self.queue.contains_requester(requester) {
            SessionStatus::Queued
        } else {
            SessionStatus::Unassigned
        }
    }

    // ── Registry operations ─────────────────────────────────────────

    /// Registers a specialist or replaces its capabilities.
    pub fn upsert_specialist(&mut self, id: SpecialistId, capabilities: SubjectSet) -> UpsertOutcome {
        self.registry.upsert(id, capabilities)
    }

    /// Adds one subject to a registered specialist.
    ///
    /// Returns `true` when the capability set changed.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::SpecialistNotFound`] for unknown identifiers.
    pub fn subscribe(&mut self, id: SpecialistId, subject: Subject) -> Result<bool, RoutingError> {
        let mut capabilities = self.capabilities_of(id)?;
        if !capabilities.insert(subject) {
            return Ok(false);
        }
        self.registry.upsert(id, capabilities);
        Ok(true)
    }

    /// Removes one subject from a registered specialist.
    ///
    /// Returns `true` when the capability set changed.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::SpecialistNotFound`] for unknown identifiers.
    pub fn unsubscribe(&mut self, id: SpecialistId, subject: Subject) -> Result<bool, RoutingError> {
        let mut capabilities = self.capabilities_of(id)?;
        if !capabilities.remove(subject) {
            return Ok(false);
        }
        self.registry.upsert(id, capabilities);
        Ok(true)
    }

    /// Removes an idle specialist from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::SpecialistNotFound`] for unknown identifiers
    /// and [`RoutingError::SpecialistBusy`] while the specialist is assigned.
    pub fn deregister(&mut self, id: SpecialistId) -> Result<Specialist, RoutingError> {
        if self.registry.is_busy(id)? {
            return Err(RoutingError::SpecialistBusy(id));
        }
        self.registry.remove(id)
    }

    // ── Sessions ────────────────────────────────────────────────────

    /// Records first contact with a requester.
    ///
    /// An existing session keeps its assignments but adopts `session_handle`.
    /// Returns `true` when a new session was created.
    pub fn open_session(&mut self, requester: RequesterId, session_handle: SessionHandle) -> bool {
        match self.sessions.get_mut(&requester) {
            Some(session) => {
                session.set_session_handle(session_handle);
                false
            }
            None => {
                self.sessions
                    .insert(requester, RequesterSession::new(requester, session_handle));
                true
            }
        }
    }

    // ── Matching ────────────────────────────────────────────────────

    /// Tries to pair `requester` with an idle specialist for `subject`.
    ///
    /// The availability gate is the caller's concern; this applies the
    /// already-assigned check, longest-idle selection, and queueing.
    pub fn request_match(
        &mut self,
        requester: RequesterId,
        session_handle: SessionHandle,
        subject: Subject,
    ) -> MatchOutcome {
        if self.sessions.get(&requester).is_some_and(RequesterSession::is_assigned) {
            return MatchOutcome::Deferred(DeferralReason::AlreadyAssigned);
        }
        self.open_session(requester, session_handle);

        if let Some(specialist) = self.registry.longest_idle(subject)
            && self.assign(requester, specialist, Some(subject)).is_ok()
        {
            return MatchOutcome::Matched(specialist);
        }
        self.queue
            .enqueue_unique(PendingRequest::new(requester, session_handle, subject));
        MatchOutcome::Queued
    }

    /// Ends one specialist's engagement with a requester.
    ///
    /// The specialist returns to idle. Offering the freed specialist the next
    /// queued request is a separate step, see [`EngineState::offer_next`].
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::RequesterNotFound`] without a session and
    /// [`RoutingError::AssignmentNotFound`] when the specialist is not
    /// assigned to the requester.
    pub fn complete(
        &mut self,
        requester: RequesterId,
        specialist: SpecialistId,
        clock: &impl Clock,
    ) -> Result<(), RoutingError> {
        let session = self
            .sessions
            .get_mut(&requester)
            .ok_or(RoutingError::RequesterNotFound(requester))?;
        if !session.release(specialist) {
            return Err(RoutingError::AssignmentNotFound {
                requester,
                specialist,
            });
        }
        if self.registry.get(specialist).is_some() {
            self.registry.mark_idle(specialist, clock)?;
        }
        Ok(())
    }

    /// Hands the oldest compatible queued request to `specialist`.
    ///
    /// Incompatible entries ahead in the queue are skipped, not removed.
    /// Returns `None` when the specialist is unknown, busy, or nothing
    /// compatible is waiting.
    pub fn offer_next(&mut self, specialist: SpecialistId) -> Option<Assignment> {
        let candidate = self.registry.get(specialist)?;
        if candidate.is_busy() {
            return None;
        }
        let capabilities = candidate.capabilities().clone();
        let sessions = &self.sessions;
        let entry = self.queue.take_first_matching(|entry| {
            capabilities.contains(entry.subject)
                && !sessions
                    .get(&entry.requester)
                    .is_some_and(RequesterSession::is_assigned)
        })?;
        self.sessions
            .entry(entry.requester)
            .or_insert_with(|| RequesterSession::new(entry.requester, entry.session_handle));
        self.assign(entry.requester, specialist, Some(entry.subject)).ok()
    }

    /// Walks the queue oldest first and pairs each waiting request with the
    /// longest-idle capable specialist.
    ///
    /// Requests nobody can take stay queued in their original order.
    pub fn drain_queue(&mut self) -> Vec<Assignment> {
        let waiting: Vec<PendingRequest> = self.queue.iter().copied().collect();
        let mut assignments = Vec::new();
        for entry in waiting {
            if self
                .sessions
                .get(&entry.requester)
                .is_some_and(RequesterSession::is_assigned)
            {
                continue;
            }
            let Some(specialist) = self.registry.longest_idle(entry.subject) else {
                continue;
            };
            self.sessions
                .entry(entry.requester)
                .or_insert_with(|| RequesterSession::new(entry.requester, entry.session_handle));
            if let Ok(assignment) = self.assign(entry.requester, specialist, Some(entry.subject)) {
                assignments.push(assignment);
            }
        }
        assignments
    }

    /// Assigns `specialist` to `requester` without subject matching.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::RequesterNotFound`] without a session,
    /// [`RoutingError::SpecialistNotFound`] for unknown specialists, and
    /// [`RoutingError::SpecialistBusy`] when the specialist is not idle.
    pub fn invite(
        &mut self,
        requester: RequesterId,
        specialist: SpecialistId,
    ) -> Result<Assignment, RoutingError> {
        if !self.sessions.contains_key(&requester) {
            return Err(RoutingError::RequesterNotFound(requester));
        }
        if self.registry.is_busy(specialist)? {
            return Err(RoutingError::SpecialistBusy(specialist));
        }
        self.assign(requester, specialist, None)
    }

    /// Releases everything tied to `requester`'s session.
    ///
    /// Assigned specialists go idle, the requester's queue entries are
    /// dropped, and the session keeps its handle for reuse. Freed specialists
    /// are not offered queued work here.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::RequesterNotFound`] without a session.
    pub fn reclaim_session(
        &mut self,
        requester: RequesterId,
        clock: &impl Clock,
    ) -> Result<ReclaimReport, RoutingError> {
        let session = self
            .sessions
            .get_mut(&requester)
            .ok_or(RoutingError::RequesterNotFound(requester))?;
        let released = session.release_all();
        for specialist in &released {
            if self.registry.get(*specialist).is_some() {
                self.registry.mark_idle(*specialist, clock)?;
            }
        }
        let dropped_requests = self.queue.remove_requester(requester);
        Ok(ReclaimReport {
            released,
            dropped_requests,
        })
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Captures the durable parts of the state.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut sessions: Vec<RequesterSession> = self.sessions.values().cloned().collect();
        sessions.sort_by_key(RequesterSession::requester);
        EngineSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            specialists: self.registry.iter().cloned().collect(),
            sessions,
            pending: self.queue.iter().copied().collect(),
        }
    }

    /// Rebuilds state from a snapshot, repairing cross-references.
    ///
    /// Assignments to unknown specialists are dropped, busy flags follow the
    /// session assignments, and queue entries that would double-book a
    /// requester are discarded.
    #[must_use]
    pub fn from_snapshot(snapshot: EngineSnapshot) -> (Self, RestoreReport) {
        let mut report = RestoreReport::default();
        let mut registry = SpecialistRegistry::from_specialists(snapshot.specialists);

        let mut sessions = HashMap::with_capacity(snapshot.sessions.len());
        let mut engaged = HashSet::new();
        for mut session in snapshot.sessions {
            let assigned: Vec<SpecialistId> =
                session.assigned_specialists().iter().copied().collect();
            for specialist in assigned {
                if registry.get(specialist).is_some() {
                    engaged.insert(specialist);
                } else {
                    session.release(specialist);
                    report.dangling_assignments += 1;
                }
            }
            sessions.insert(session.requester(), session);
        }

        report.stale_reservations = registry.reconcile_reservations(&engaged);

        let mut queue = PendingRequestQueue::new();
        for entry in snapshot.pending {
            let waiting = sessions
                .get(&entry.requester)
                .is_some_and(|session: &RequesterSession| !session.is_assigned());
            if waiting && queue.enqueue_unique(entry) {
                continue;
            }
            report.orphaned_requests += 1;
        }

        let state = Self {
            registry,
            sessions,
            queue,
        };
        (state, report)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn capabilities_of(&self, id: SpecialistId) -> Result<SubjectSet, RoutingError> {
        self.registry
            .get(id)
            .map(|specialist| specialist.capabilities().clone())
            .ok_or(RoutingError::SpecialistNotFound(id))
    }

    /// Commits a pairing. The requester leaves the queue entirely, since an
    /// assigned requester may not also be waiting.
    fn assign(
        &mut self,
        requester: RequesterId,
        specialist: SpecialistId,
        subject: Option<Subject>,
    ) -> Result<Assignment, RoutingError> {
        let session = self
            .sessions
            .get_mut(&requester)
            .ok_or(RoutingError::RequesterNotFound(requester))?;
        self.registry.mark_busy(specialist)?;
        session.assign(specialist);
        let session_handle = session.session_handle();
        self.queue.remove_requester(requester);
        Ok(Assignment {
            requester,
            session_handle,
            specialist,
            subject,
        })
    }
}
