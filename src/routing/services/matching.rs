//! Service layer for specialist matching.
//!
//! Provides [`MatchingService`] which owns the engine state behind a single
//! async mutex, applies the availability gate, and reports outcomes to the
//! host through [`MatchNotifier`].

use crate::availability::AvailabilityGate;
use crate::routing::{
    domain::{
        Assignment, DeferralReason, EngineSnapshot, EngineState, MatchOutcome, PendingRequest,
        ReclaimReport, RequesterId, RequesterSession, RoutingError, SessionHandle, SessionStatus,
        Specialist, SpecialistId, Subject, SubjectSet, UpsertOutcome,
    },
    ports::{EngineStateStore, MatchNotifier, StateStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Service-level errors for matching operations.
#[derive(Debug, Error)]
pub enum MatchingServiceError {
    /// A routing rule rejected the operation.
    #[error(transparent)]
    Routing(#[from] RoutingError),
    /// Snapshot persistence failed.
    #[error(transparent)]
    StateStore(#[from] StateStoreError),
}

/// Result type for matching service operations.
pub type MatchingServiceResult<T> = Result<T, MatchingServiceError>;

/// Matching orchestration service.
///
/// Every mutation runs as one short critical section on the engine lock.
/// Notifications are sent after the lock is released; a failed notification
/// is logged and never undoes the committed change.
pub struct MatchingService<N, C>
where
    N: MatchNotifier,
    C: Clock + Send + Sync,
{
    state: Mutex<EngineState>,
    gate: AvailabilityGate,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<N, C> MatchingService<N, C>
where
    N: MatchNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a service over empty engine state.
    #[must_use]
    pub fn new(gate: AvailabilityGate, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self::with_state(EngineState::new(), gate, notifier, clock)
    }

    /// Creates a service over existing engine state.
    #[must_use]
    pub fn with_state(
        state: EngineState,
        gate: AvailabilityGate,
        notifier: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            gate,
            notifier,
            clock,
        }
    }

    /// Creates a service from the snapshot held by `store`.
    ///
    /// A missing snapshot starts empty. A snapshot that cannot be loaded is
    /// logged and also starts empty rather than failing startup.
    pub async fn restore<S>(
        store: &S,
        gate: AvailabilityGate,
        notifier: Arc<N>,
        clock: Arc<C>,
    ) -> Self
    where
        S: EngineStateStore + ?Sized,
    {
        let state = match store.load().await {
            Ok(Some(snapshot)) => {
                let (state, report) = EngineState::from_snapshot(snapshot);
                if !report.is_clean() {
                    warn!(
                        dangling_assignments = report.dangling_assignments,
                        stale_reservations = report.stale_reservations,
                        orphaned_requests = report.orphaned_requests,
                        "repaired inconsistent engine snapshot"
                    );
                }
                info!(
                    specialists = state.registry().len(),
                    pending = state.queue().len(),
                    "restored engine state"
                );
                state
            }
            Ok(None) => {
                info!("no saved engine state, starting empty");
                EngineState::new()
            }
            Err(err) => {
                warn!(error = %err, "failed to load engine state, starting empty");
                EngineState::new()
            }
        };
        Self::with_state(state, gate, notifier, clock)
    }

    /// Writes the current state to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::StateStore`] when the store rejects the
    /// snapshot.
    pub async fn save_to<S>(&self, store: &S) -> MatchingServiceResult<()>
    where
        S: EngineStateStore + ?Sized,
    {
        let snapshot = self.snapshot().await;
        store.save(&snapshot).await?;
        info!(
            specialists = snapshot.specialists.len(),
            sessions = snapshot.sessions.len(),
            pending = snapshot.pending.len(),
            "saved engine state"
        );
        Ok(())
    }

    /// Captures the current state.
    pub async fn snapshot(&self) -> EngineSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Returns the availability gate.
    #[must_use]
    pub const fn gate(&self) -> &AvailabilityGate {
        &self.gate
    }

    // ── Registry ────────────────────────────────────────────────────

    /// Registers a specialist or replaces its capabilities.
    ///
    /// An idle specialist is immediately offered the oldest compatible queued
    /// request while the gate is open.
    pub async fn upsert_specialist(
        &self,
        id: SpecialistId,
        capabilities: SubjectSet,
    ) -> UpsertOutcome {
        let (outcome, offered) = {
            let mut state = self.state.lock().await;
            let outcome = state.upsert_specialist(id, capabilities);
            (outcome, self.drain_for(&mut state, id))
        };
        debug!(specialist = %id, ?outcome, "specialist upserted");
        if let Some(assignment) = offered {
            self.notify_matched(&assignment).await;
        }
        outcome
    }

    /// Adds one subject to a specialist's capabilities.
    ///
    /// Returns `true` when the capabilities changed.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::Routing`] for unknown specialists.
    pub async fn subscribe(&self, id: SpecialistId, subject: Subject) -> MatchingServiceResult<bool> {
        let (changed, offered) = {
            let mut state = self.state.lock().await;
            let changed = state.subscribe(id, subject)?;
            let offered = if changed {
                self.drain_for(&mut state, id)
            } else {
                None
            };
            (changed, offered)
        };
        if let Some(assignment) = offered {
            self.notify_matched(&assignment).await;
        }
        Ok(changed)
    }

    /// Removes one subject from a specialist's capabilities.
    ///
    /// Returns `true` when the capabilities changed.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::Routing`] for unknown specialists.
    pub async fn unsubscribe(
        &self,
        id: SpecialistId,
        subject: Subject,
    ) -> MatchingServiceResult<bool> {
        Ok(self.state.lock().await.unsubscribe(id, subject)?)
    }

    /// Removes an idle specialist.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::Routing`] when the specialist is
    /// unknown or currently assigned.
    pub async fn deregister_specialist(&self, id: SpecialistId) -> MatchingServiceResult<Specialist> {
        let removed = self.state.lock().await.deregister(id)?;
        info!(specialist = %id, "specialist deregistered");
        Ok(removed)
    }

    /// Returns one specialist.
    pub async fn specialist(&self, id: SpecialistId) -> Option<Specialist> {
        self.state.lock().await.registry().get(id).cloned()
    }

    /// Returns every specialist in registration order.
    pub async fn specialists(&self) -> Vec<Specialist> {
        self.state.lock().await.registry().iter().cloned().collect()
    }

    /// Returns whether a specialist is busy.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::Routing`] for unknown specialists.
    pub async fn is_busy(&self, id: SpecialistId) -> MatchingServiceResult<bool> {
        Ok(self.state.lock().await.registry().is_busy(id)?)
    }

    // ── Sessions and matching ───────────────────────────────────────

    /// Records first contact with a requester.
    ///
    /// Returns `true` when a new session was created.
    pub async fn open_session(&self, requester: RequesterId, session_handle: SessionHandle) -> bool {
        self.state.lock().await.open_session(requester, session_handle)
    }

    /// Asks for a specialist in `subject`.
    ///
    /// A closed gate defers the request without touching any state. While
    /// the gate is open, requests left queued by earlier closed periods are
    /// served before this one.
    pub async fn request_match(
        &self,
        requester: RequesterId,
        session_handle: SessionHandle,
        subject: Subject,
    ) -> MatchOutcome {
        if !self.gate.is_open(&*self.clock) {
            debug!(%requester, %subject, "request outside service hours");
            self.notify_deferred(requester, session_handle, DeferralReason::OutOfHours)
                .await;
            return MatchOutcome::Deferred(DeferralReason::OutOfHours);
        }

        let (backlog, outcome) = {
            let mut state = self.state.lock().await;
            let drained = state.drain_queue();
            (drained, state.request_match(requester, session_handle, subject))
        };

        for assignment in &backlog {
            info!(
                requester = %assignment.requester,
                specialist = %assignment.specialist,
                "queued request assigned"
            );
            self.notify_matched(assignment).await;
        }

        match outcome {
            MatchOutcome::Matched(specialist) => {
                info!(%requester, %specialist, %subject, "request matched");
                self.notify_matched(&Assignment {
                    requester,
                    session_handle,
                    specialist,
                    subject: Some(subject),
                })
                .await;
            }
            MatchOutcome::Queued => {
                debug!(%requester, %subject, "request queued");
                self.notify_deferred(requester, session_handle, DeferralReason::Queued)
                    .await;
            }
            MatchOutcome::Deferred(reason) => {
                debug!(%requester, %subject, %reason, "request deferred");
                self.notify_deferred(requester, session_handle, reason).await;
            }
        }
        outcome
    }

    /// Ends a specialist's engagement with a requester.
    ///
    /// While the gate is open the freed specialist takes the oldest
    /// compatible queued request; that assignment is returned.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::Routing`] when the requester has no
    /// session or the specialist is not assigned to it.
    pub async fn complete(
        &self,
        requester: RequesterId,
        specialist: SpecialistId,
    ) -> MatchingServiceResult<Option<Assignment>> {
        let offered = {
            let mut state = self.state.lock().await;
            state.complete(requester, specialist, &*self.clock)?;
            self.drain_for(&mut state, specialist)
        };
        info!(%requester, %specialist, "engagement completed");
        if let Some(assignment) = &offered {
            self.notify_matched(assignment).await;
        }
        Ok(offered)
    }

    /// Assigns a specific specialist to a requester regardless of subject.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::Routing`] when the requester or
    /// specialist is unknown or the specialist is busy.
    pub async fn invite(
        &self,
        requester: RequesterId,
        specialist: SpecialistId,
    ) -> MatchingServiceResult<Assignment> {
        let assignment = self.state.lock().await.invite(requester, specialist)?;
        info!(%requester, %specialist, "specialist invited");
        self.notify_matched(&assignment).await;
        Ok(assignment)
    }

    /// Releases everything held by a requester's session.
    ///
    /// Freed specialists are not offered queued work here; see
    /// [`MatchingService::offer_to_next`].
    ///
    /// # Errors
    ///
    /// Returns [`MatchingServiceError::Routing`] when the requester has no
    /// session.
    pub async fn reclaim_session(&self, requester: RequesterId) -> MatchingServiceResult<ReclaimReport> {
        let report = self
            .state
            .lock()
            .await
            .reclaim_session(requester, &*self.clock)?;
        info!(
            %requester,
            released = report.released.len(),
            dropped_requests = report.dropped_requests,
            "session reclaimed"
        );
        Ok(report)
    }

    /// Offers an idle specialist the oldest compatible queued request.
    ///
    /// Returns `None` when the gate is closed, the specialist is unknown or
    /// busy, or nothing compatible is waiting.
    pub async fn offer_to_next(&self, specialist: SpecialistId) -> Option<Assignment> {
        let offered = {
            let mut state = self.state.lock().await;
            self.drain_for(&mut state, specialist)
        };
        if let Some(assignment) = &offered {
            self.notify_matched(assignment).await;
        }
        offered
    }

    /// Returns the queued requests, oldest first.
    pub async fn pending_requests(&self) -> Vec<PendingRequest> {
        self.state.lock().await.queue().iter().copied().collect()
    }

    /// Returns a copy of the requester's session.
    pub async fn session(&self, requester: RequesterId) -> Option<RequesterSession> {
        self.state.lock().await.session(requester).cloned()
    }

    /// Returns the requester's lifecycle status.
    pub async fn session_status(&self, requester: RequesterId) -> SessionStatus {
        self.state.lock().await.session_status(requester)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn drain_for(&self, state: &mut EngineState, specialist: SpecialistId) -> Option<Assignment> {
        if !self.gate.is_open(&*self.clock) {
            return None;
        }
        let assignment = state.offer_next(specialist)?;
        info!(
            requester = %assignment.requester,
            %specialist,
            "queued request assigned"
        );
        Some(assignment)
    }

    async fn notify_matched(&self, assignment: &Assignment) {
        if let Err(err) = self.notifier.on_matched(assignment).await {
            error!(
                requester = %assignment.requester,
                specialist = %assignment.specialist,
                error = %err,
                "match committed but notification failed"
            );
        }
    }

    async fn notify_deferred(
        &self,
        requester: RequesterId,
        session_handle: SessionHandle,
        reason: DeferralReason,
    ) {
        if let Err(err) = self
            .notifier
            .on_deferred(requester, session_handle, reason)
            .await
        {
            error!(%requester, %reason, error = %err, "deferral notification failed");
        }
    }
}
