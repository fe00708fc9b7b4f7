//! Port contracts for routing persistence and host callbacks.
//!
//! Ports define infrastructure-agnostic interfaces used by the matching
//! service.

pub mod hooks;
pub mod state_store;

pub use hooks::{HookError, HookResult, MatchNotifier, SessionCleanup};
pub use state_store::{EngineStateStore, StateStoreError, StateStoreResult};
