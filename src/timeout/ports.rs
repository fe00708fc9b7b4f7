//! Callback port fired when a session's inactivity countdown expires.

use crate::routing::domain::{RequesterId, SessionHandle};
use crate::routing::ports::HookResult;
use async_trait::async_trait;

/// Receives expired sessions.
///
/// Implementations are expected to tear down host resources and then call
/// the matching service's `reclaim_session`.
#[async_trait]
pub trait SessionReclaimer: Send + Sync + 'static {
    /// The inactivity countdown for `requester` ran out.
    async fn on_session_reclaimed(
        &self,
        requester: RequesterId,
        session_handle: SessionHandle,
    ) -> HookResult<()>;
}
