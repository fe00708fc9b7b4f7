//! Per-session inactivity countdowns.

use super::SessionReclaimer;
use crate::routing::domain::{RequesterId, SessionHandle};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Result of [`SessionTimeoutScheduler::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStart {
    /// A new countdown was armed.
    Started,
    /// A countdown was already running; nothing changed.
    AlreadyRunning,
}

struct PendingTimer {
    id: Uuid,
    deadline: Instant,
    task: JoinHandle<()>,
}

type TimerTable = Arc<Mutex<HashMap<RequesterId, PendingTimer>>>;

/// Runs at most one inactivity countdown per requester.
///
/// A countdown that expires first removes its own table entry under the
/// table lock and only then invokes the reclaimer. Cancellation takes the
/// same lock, so whichever side gets there first wins and reclamation
/// happens at most once per countdown.
pub struct SessionTimeoutScheduler<R>
where
    R: SessionReclaimer,
{
    reclaimer: Arc<R>,
    timeout: Duration,
    timers: TimerTable,
}

impl<R> SessionTimeoutScheduler<R>
where
    R: SessionReclaimer,
{
    /// Creates a scheduler whose countdowns last `timeout`.
    #[must_use]
    pub fn new(reclaimer: Arc<R>, timeout: Duration) -> Self {
        Self {
            reclaimer,
            timeout,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the countdown length.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arms a countdown for `requester`.
    ///
    /// Starting while one is already running is a benign no-op reported as
    /// [`TimerStart::AlreadyRunning`]; the existing deadline is kept.
    pub async fn start(&self, requester: RequesterId, session_handle: SessionHandle) -> TimerStart {
        let mut timers = self.timers.lock().await;
        if timers.contains_key(&requester) {
            debug!(%requester, "inactivity timer already running");
            return TimerStart::AlreadyRunning;
        }

        let id = Uuid::new_v4();
        let deadline = Instant::now() + self.timeout;
        let task = tokio::spawn(run_countdown(
            Arc::clone(&self.timers),
            Arc::clone(&self.reclaimer),
            requester,
            session_handle,
            id,
            deadline,
        ));
        timers.insert(
            requester,
            PendingTimer {
                id,
                deadline,
                task,
            },
        );
        debug!(%requester, timeout_secs = self.timeout.as_secs(), "inactivity timer started");
        TimerStart::Started
    }

    /// Cancels the countdown for `requester`.
    ///
    /// Returns `true` when a countdown was stopped before it claimed its
    /// expiry. Returns `false` when none was running or the reclaim callback
    /// has already begun.
    pub async fn cancel(&self, requester: RequesterId) -> bool {
        let removed = self.timers.lock().await.remove(&requester);
        match removed {
            Some(timer) => {
                timer.task.abort();
                debug!(%requester, "inactivity timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Returns whether a countdown is armed for `requester`.
    pub async fn is_pending(&self, requester: RequesterId) -> bool {
        self.timers.lock().await.contains_key(&requester)
    }

    /// Returns the deadline of the armed countdown, if any.
    pub async fn deadline(&self, requester: RequesterId) -> Option<Instant> {
        self.timers
            .lock()
            .await
            .get(&requester)
            .map(|timer| timer.deadline)
    }

    /// Returns how many countdowns are armed.
    pub async fn pending_count(&self) -> usize {
        self.timers.lock().await.len()
    }
}

async fn run_countdown<R>(
    timers: TimerTable,
    reclaimer: Arc<R>,
    requester: RequesterId,
    session_handle: SessionHandle,
    id: Uuid,
    deadline: Instant,
) where
    R: SessionReclaimer,
{
    tokio::time::sleep_until(deadline).await;

    let claimed = {
        let mut table = timers.lock().await;
        match table.get(&requester) {
            Some(timer) if timer.id == id => table.remove(&requester).is_some(),
            _ => false,
        }
    };
    if !claimed {
        return;
    }

    info!(%requester, %session_handle, "session inactive, reclaiming");
    if let Err(err) = reclaimer
        .on_session_reclaimed(requester, session_handle)
        .await
    {
        error!(%requester, %session_handle, error = %err, "session reclaim callback failed");
    }
}
