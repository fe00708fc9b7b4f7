//! Persistence port for engine snapshots.

use crate::routing::domain::EngineSnapshot;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for snapshot persistence operations.
pub type StateStoreResult<T> = Result<T, StateStoreError>;

/// Snapshot persistence contract.
///
/// Implementations must make `save` atomic from the engine's point of view:
/// a concurrent `load` sees either the previous snapshot or the new one,
/// never a mix.
#[async_trait]
pub trait EngineStateStore: Send + Sync {
    /// Loads the most recent snapshot.
    ///
    /// Returns `None` when nothing has been saved yet.
    async fn load(&self) -> StateStoreResult<Option<EngineSnapshot>>;

    /// Replaces the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Persistence`] when the write fails.
    async fn save(&self, snapshot: &EngineSnapshot) -> StateStoreResult<()>;
}

/// Errors returned by snapshot store implementations.
#[derive(Debug, Clone, Error)]
pub enum StateStoreError {
    /// The stored snapshot was written by an incompatible layout version.
    #[error("unsupported snapshot format version {0}")]
    UnsupportedFormat(u32),

    /// Persisted data could not be decoded into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StateStoreError {
    /// Wraps a data-quality or deserialization error from stored snapshots.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
