//! Wiring between expired inactivity countdowns and the matching service.

use super::MatchingService;
use crate::routing::{
    domain::{RequesterId, SessionHandle},
    ports::{HookError, HookResult, MatchNotifier, SessionCleanup},
};
use crate::timeout::SessionReclaimer;
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, error};

/// Reclaims a timed-out session end to end.
///
/// Host cleanup runs first, then the session is reclaimed, then every
/// released specialist is offered the next compatible queued request. A
/// failed cleanup does not stop the reclaim; its error is returned once the
/// engine state has been released.
pub struct TimeoutReclaimer<K, N, C>
where
    K: SessionCleanup,
    N: MatchNotifier,
    C: Clock + Send + Sync,
{
    cleanup: Arc<K>,
    service: Arc<MatchingService<N, C>>,
}

impl<K, N, C> TimeoutReclaimer<K, N, C>
where
    K: SessionCleanup,
    N: MatchNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a reclaimer over `service`.
    #[must_use]
    pub const fn new(cleanup: Arc<K>, service: Arc<MatchingService<N, C>>) -> Self {
        Self { cleanup, service }
    }
}

#[async_trait]
impl<K, N, C> SessionReclaimer for TimeoutReclaimer<K, N, C>
where
    K: SessionCleanup + 'static,
    N: MatchNotifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn on_session_reclaimed(
        &self,
        requester: RequesterId,
        session_handle: SessionHandle,
    ) -> HookResult<()> {
        let cleanup_result = self.cleanup.cleanup(requester, session_handle).await;
        if let Err(err) = &cleanup_result {
            error!(%requester, %session_handle, error = %err, "session cleanup failed");
        }

        let report = self
            .service
            .reclaim_session(requester)
            .await
            .map_err(HookError::delivery)?;
        for specialist in report.released {
            if let Some(assignment) = self.service.offer_to_next(specialist).await {
                debug!(
                    %specialist,
                    requester = %assignment.requester,
                    "released specialist picked up queued request"
                );
            }
        }
        cleanup_result
    }
}
