//! Snapshot persistence through the JSON file store.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tutorlink::{
    availability::AvailabilityGate,
    routing::{
        adapters::{DEFAULT_SNAPSHOT_FILE, JsonFileStateStore, memory::RecordingNotifier},
        domain::{EngineSnapshot, SessionStatus, Subject},
        ports::{EngineStateStore, StateStoreError},
        services::MatchingService,
    },
};

use super::helpers::{TestService, handle, requester, service, specialist, subjects};

struct StateDir {
    _temp: TempDir,
    path: Utf8PathBuf,
}

#[fixture]
fn state_dir() -> StateDir {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(temp.path().join("state")).expect("utf-8 temp path");
    StateDir { _temp: temp, path }
}

fn temp_files(state_dir: &StateDir) -> Vec<String> {
    std::fs::read_dir(&state_dir.path)
        .expect("state dir readable")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

async fn restore_from(store: &JsonFileStateStore) -> TestService {
    MatchingService::restore(
        store,
        AvailabilityGate::always_open(),
        Arc::new(RecordingNotifier::new()),
        Arc::new(DefaultClock),
    )
    .await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn saved_state_survives_restart(service: TestService, state_dir: StateDir) {
    let store = JsonFileStateStore::open(&state_dir.path).expect("open store");
    service
        .upsert_specialist(specialist(1), subjects([Subject::Math, Subject::Physics]))
        .await;
    service
        .upsert_specialist(specialist(2), subjects([Subject::Biology]))
        .await;
    service
        .request_match(requester(1), handle(1), Subject::Physics)
        .await;
    service
        .request_match(requester(2), handle(2), Subject::Math)
        .await;

    service.save_to(&store).await.expect("save succeeds");
    let restored = restore_from(&store).await;

    assert_eq!(restored.snapshot().await, service.snapshot().await);
    assert_eq!(
        restored.session_status(requester(2)).await,
        SessionStatus::Queued
    );
    restored
        .complete(requester(1), specialist(1))
        .await
        .expect("assignment restored");
    assert_eq!(
        restored.session_status(requester(2)).await,
        SessionStatus::Assigned
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_snapshot_loads_as_none(state_dir: StateDir) {
    let store = JsonFileStateStore::open(&state_dir.path).expect("open store");

    assert!(store.load().await.expect("load succeeds").is_none());
    assert_eq!(restore_from(&store).await.snapshot().await, EngineSnapshot::empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn save_replaces_file_without_leaving_temp_file(service: TestService, state_dir: StateDir) {
    let store = JsonFileStateStore::open(&state_dir.path).expect("open store");
    service
        .upsert_specialist(specialist(1), subjects([Subject::Geography]))
        .await;

    service.save_to(&store).await.expect("first save");
    service.save_to(&store).await.expect("second save");

    assert!(state_dir.path.join(DEFAULT_SNAPSHOT_FILE).exists());
    assert!(temp_files(&state_dir).is_empty());
    let loaded = store.load().await.expect("load succeeds").expect("snapshot saved");
    assert_eq!(loaded.specialists.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_saves_all_succeed(service: TestService, state_dir: StateDir) {
    let store = Arc::new(JsonFileStateStore::open(&state_dir.path).expect("open store"));
    service
        .upsert_specialist(specialist(1), subjects([Subject::Math, Subject::Physics]))
        .await;
    let snapshot = service.snapshot().await;

    for _ in 0..20 {
        let saves: Vec<_> = (0..8)
            .map(|_| {
                let writer = Arc::clone(&store);
                let pending = snapshot.clone();
                tokio::spawn(async move { writer.save(&pending).await })
            })
            .collect();
        for save in saves {
            save.await.expect("save task").expect("save succeeds");
        }
    }

    assert!(temp_files(&state_dir).is_empty());
    let loaded = store.load().await.expect("load succeeds").expect("snapshot saved");
    assert_eq!(loaded, snapshot);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn corrupt_snapshot_is_reported_and_restore_starts_empty(state_dir: StateDir) {
    let store = JsonFileStateStore::open(&state_dir.path).expect("open store");
    std::fs::write(state_dir.path.join(DEFAULT_SNAPSHOT_FILE), "{ not json").expect("write");

    assert!(matches!(
        store.load().await,
        Err(StateStoreError::InvalidPersistedData(_))
    ));
    assert_eq!(restore_from(&store).await.snapshot().await, EngineSnapshot::empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn future_format_version_is_rejected(state_dir: StateDir) {
    let store = JsonFileStateStore::open(&state_dir.path).expect("open store");
    let future = EngineSnapshot {
        format_version: 2,
        ..EngineSnapshot::empty()
    };
    store.save(&future).await.expect("save succeeds");

    assert!(matches!(
        store.load().await,
        Err(StateStoreError::UnsupportedFormat(2))
    ));
}
