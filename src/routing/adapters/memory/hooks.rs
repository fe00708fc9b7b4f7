//! In-memory hook adapters that record what the engine reported.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::routing::{
    domain::{Assignment, DeferralReason, RequesterId, SessionHandle},
    ports::{HookError, HookResult, MatchNotifier, SessionCleanup},
};

/// One notification observed by [`RecordingNotifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedNotification {
    /// `on_matched` was called.
    Matched(Assignment),
    /// `on_deferred` was called.
    Deferred {
        /// Requester whose request was deferred.
        requester: RequesterId,
        /// Requester's channel.
        session_handle: SessionHandle,
        /// Why the request was deferred.
        reason: DeferralReason,
    },
}

/// Notifier that keeps every notification in arrival order.
///
/// Useful for tests and for hosts that poll rather than react.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<RecordedNotification>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notifications received so far.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Delivery`] when lock acquisition fails.
    pub fn events(&self) -> HookResult<Vec<RecordedNotification>> {
        let events = self
            .events
            .read()
            .map_err(|err| HookError::delivery(std::io::Error::other(err.to_string())))?;
        Ok(events.clone())
    }

    /// Returns only the reported assignments.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Delivery`] when lock acquisition fails.
    pub fn assignments(&self) -> HookResult<Vec<Assignment>> {
        Ok(self
            .events()?
            .into_iter()
            .filter_map(|event| match event {
                RecordedNotification::Matched(assignment) => Some(assignment),
                RecordedNotification::Deferred { .. } => None,
            })
            .collect())
    }

    fn record(&self, event: RecordedNotification) -> HookResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|err| HookError::delivery(std::io::Error::other(err.to_string())))?;
        events.push(event);
        Ok(())
    }
}

#[async_trait]
impl MatchNotifier for RecordingNotifier {
    async fn on_matched(&self, assignment: &Assignment) -> HookResult<()> {
        self.record(RecordedNotification::Matched(*assignment))
    }

    async fn on_deferred(
        &self,
        requester: RequesterId,
        session_handle: SessionHandle,
        reason: DeferralReason,
    ) -> HookResult<()> {
        self.record(RecordedNotification::Deferred {
            requester,
            session_handle,
            reason,
        })
    }
}

/// Cleanup hook that records which sessions it tore down.
#[derive(Debug, Clone, Default)]
pub struct RecordingCleanup {
    cleaned: Arc<RwLock<Vec<(RequesterId, SessionHandle)>>>,
}

impl RecordingCleanup {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sessions cleaned up so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Delivery`] when lock acquisition fails.
    pub fn cleaned(&self) -> HookResult<Vec<(RequesterId, SessionHandle)>> {
        let cleaned = self
            .cleaned
            .read()
            .map_err(|err| HookError::delivery(std::io::Error::other(err.to_string())))?;
        Ok(cleaned.clone())
    }
}

#[async_trait]
impl SessionCleanup for RecordingCleanup {
    async fn cleanup(
        &self,
        requester: RequesterId,
        session_handle: SessionHandle,
    ) -> HookResult<()> {
        let mut cleaned = self
            .cleaned
            .write()
            .map_err(|err| HookError::delivery(std::io::Error::other(err.to_string())))?;
        cleaned.push((requester, session_handle));
        Ok(())
    }
}
