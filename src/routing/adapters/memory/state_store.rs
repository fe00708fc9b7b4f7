//! In-memory snapshot store for tests and embedded use.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::routing::{
    domain::EngineSnapshot,
    ports::{EngineStateStore, StateStoreError, StateStoreResult},
};

/// Thread-safe in-memory snapshot store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEngineStateStore {
    snapshot: Arc<RwLock<Option<EngineSnapshot>>>,
}

impl InMemoryEngineStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: EngineSnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(snapshot))),
        }
    }
}

#[async_trait]
impl EngineStateStore for InMemoryEngineStateStore {
    async fn load(&self) -> StateStoreResult<Option<EngineSnapshot>> {
        let guard = self.snapshot.read().map_err(|err| {
            StateStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        match guard.as_ref() {
            Some(snapshot) if !snapshot.is_supported() => {
                Err(StateStoreError::UnsupportedFormat(snapshot.format_version))
            }
            other => Ok(other.cloned()),
        }
    }

    async fn save(&self, snapshot: &EngineSnapshot) -> StateStoreResult<()> {
        let mut guard = self.snapshot.write().map_err(|err| {
            StateStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}
