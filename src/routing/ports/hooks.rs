//! Host-facing hooks invoked by the matching service.
//!
//! Hooks run after engine state has been committed and outside the engine
//! lock. A failing hook never rolls back the match it reports.

use crate::routing::domain::{Assignment, DeferralReason, RequesterId, SessionHandle};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for host hook invocations.
pub type HookResult<T> = Result<T, HookError>;

/// Notifications about match decisions, used by the host to grant channel
/// access and tell people what happened.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    /// A specialist has been assigned to a requester.
    async fn on_matched(&self, assignment: &Assignment) -> HookResult<()>;

    /// A request could not be matched immediately.
    async fn on_deferred(
        &self,
        requester: RequesterId,
        session_handle: SessionHandle,
        reason: DeferralReason,
    ) -> HookResult<()>;
}

/// Host-side teardown run before a timed-out session is reclaimed, such as
/// deleting the requester's private channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCleanup: Send + Sync {
    /// Releases host resources held for the session.
    async fn cleanup(&self, requester: RequesterId, session_handle: SessionHandle)
    -> HookResult<()>;
}

/// Errors returned by host hook implementations.
#[derive(Debug, Clone, Error)]
pub enum HookError {
    /// The host could not deliver the notification or perform the action.
    #[error("host hook failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    /// Wraps a host delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
