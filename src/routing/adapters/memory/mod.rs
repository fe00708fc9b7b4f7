//! In-memory adapters for routing ports.

mod hooks;
mod state_store;

pub use hooks::{RecordedNotification, RecordingCleanup, RecordingNotifier};
pub use state_store::InMemoryEngineStateStore;
