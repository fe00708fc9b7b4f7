//! Serializable image of the engine state.

use super::{PendingRequest, RequesterSession, Specialist};
use serde::{Deserialize, Serialize};

/// Snapshot layout version written by this build.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Durable form of the engine state.
///
/// The subject index is not stored; restore rebuilds it from the
/// specialists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Layout version, checked on restore.
    pub format_version: u32,
    /// Specialists in registration order.
    pub specialists: Vec<Specialist>,
    /// Requester sessions ordered by requester identifier.
    pub sessions: Vec<RequesterSession>,
    /// Pending requests, oldest first.
    pub pending: Vec<PendingRequest>,
}

impl EngineSnapshot {
    /// Creates a snapshot of an empty engine.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            specialists: Vec::new(),
            sessions: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Returns whether this build can read the snapshot.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.format_version == SNAPSHOT_FORMAT_VERSION
    }
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
