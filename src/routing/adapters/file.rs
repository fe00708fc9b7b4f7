//! JSON file-backed snapshot store with atomic replacement.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::routing::{
    domain::EngineSnapshot,
    ports::{EngineStateStore, StateStoreError, StateStoreResult},
};

/// Default snapshot file name inside the state directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "engine_state.json";

/// Snapshot store writing pretty-printed JSON into a capability directory.
///
/// Each save writes its own uniquely named sibling temporary file and renames
/// it over the target, so a reader sees either the old snapshot or a new one.
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    dir: Arc<Dir>,
    file_name: String,
}

impl JsonFileStateStore {
    /// Creates a store over an already opened directory.
    #[must_use]
    pub fn new(dir: Dir, file_name: impl Into<String>) -> Self {
        Self {
            dir: Arc::new(dir),
            file_name: file_name.into(),
        }
    }

    /// Opens (creating if needed) `directory` and stores snapshots in
    /// [`DEFAULT_SNAPSHOT_FILE`] inside it.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Persistence`] when the directory cannot be
    /// created or opened.
    pub fn open(directory: &Utf8Path) -> StateStoreResult<Self> {
        Dir::create_ambient_dir_all(directory, ambient_authority())
            .map_err(StateStoreError::persistence)?;
        let dir = Dir::open_ambient_dir(directory, ambient_authority())
            .map_err(StateStoreError::persistence)?;
        Ok(Self::new(dir, DEFAULT_SNAPSHOT_FILE))
    }

    /// Returns the snapshot file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn temp_name(&self) -> String {
        format!("{}.{}.tmp", self.file_name, Uuid::new_v4())
    }
}

fn read_snapshot(dir: &Dir, file_name: &str) -> StateStoreResult<Option<EngineSnapshot>> {
    let contents = match dir.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StateStoreError::persistence(err)),
    };
    let snapshot: EngineSnapshot =
        serde_json::from_str(&contents).map_err(StateStoreError::invalid_persisted_data)?;
    if !snapshot.is_supported() {
        return Err(StateStoreError::UnsupportedFormat(snapshot.format_version));
    }
    Ok(Some(snapshot))
}

fn write_snapshot(
    dir: &Dir,
    file_name: &str,
    temp_name: &str,
    snapshot: &EngineSnapshot,
) -> StateStoreResult<()> {
    let json = serde_json::to_vec_pretty(snapshot).map_err(StateStoreError::persistence)?;
    dir.write(temp_name, json)
        .map_err(StateStoreError::persistence)?;
    dir.rename(temp_name, dir, file_name).map_err(|err| {
        if let Err(cleanup) = dir.remove_file(temp_name) {
            warn!(temp_name, error = %cleanup, "temporary snapshot left behind");
        }
        StateStoreError::persistence(err)
    })
}

#[async_trait]
impl EngineStateStore for JsonFileStateStore {
    async fn load(&self) -> StateStoreResult<Option<EngineSnapshot>> {
        let dir = Arc::clone(&self.dir);
        let file_name = self.file_name.clone();
        tokio::task::spawn_blocking(move || read_snapshot(&dir, &file_name))
            .await
            .map_err(StateStoreError::persistence)?
    }

    async fn save(&self, snapshot: &EngineSnapshot) -> StateStoreResult<()> {
        let dir = Arc::clone(&self.dir);
        let file_name = self.file_name.clone();
        let temp_name = self.temp_name();
        let snapshot = snapshot.clone();
        tokio::task::spawn_blocking(move || write_snapshot(&dir, &file_name, &temp_name, &snapshot))
            .await
            .map_err(StateStoreError::persistence)?
    }
}
