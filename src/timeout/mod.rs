//! Inactivity countdowns that reclaim idle requester sessions.
//!
//! Each requester has at most one countdown. The host starts it when the
//! requester goes offline and cancels it when they come back; expiry hands
//! the session to a [`SessionReclaimer`].

mod ports;
mod scheduler;

pub use ports::SessionReclaimer;
pub use scheduler::{SessionTimeoutScheduler, TimerStart};
