//! Inactivity timeouts driving session reclamation.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::rstest;
use tutorlink::{
    config::EngineConfig,
    routing::{
        adapters::memory::{RecordingCleanup, RecordingNotifier},
        domain::{MatchOutcome, SessionStatus, Subject},
        services::TimeoutReclaimer,
    },
    timeout::{SessionTimeoutScheduler, TimerStart},
};

use super::helpers::{TestService, handle, requester, service_with, specialist, subjects};

type Reclaimer = TimeoutReclaimer<RecordingCleanup, RecordingNotifier, DefaultClock>;

struct Wiring {
    service: Arc<TestService>,
    cleanup: Arc<RecordingCleanup>,
    scheduler: SessionTimeoutScheduler<Reclaimer>,
}

fn wire(timeout: Duration) -> Wiring {
    let service = Arc::new(service_with(&Arc::new(RecordingNotifier::new())));
    let cleanup = Arc::new(RecordingCleanup::new());
    let reclaimer = TimeoutReclaimer::new(Arc::clone(&cleanup), Arc::clone(&service));
    let scheduler = SessionTimeoutScheduler::new(Arc::new(reclaimer), timeout);
    Wiring {
        service,
        cleanup,
        scheduler,
    }
}

fn default_timeout() -> Duration {
    EngineConfig::default().session_timeout()
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn expired_session_is_cleaned_up_and_specialist_moves_on() {
    let wiring = wire(default_timeout());
    let service = &wiring.service;
    service
        .upsert_specialist(specialist(1), subjects([Subject::History]))
        .await;
    service
        .request_match(requester(1), handle(1), Subject::History)
        .await;
    service
        .request_match(requester(2), handle(2), Subject::History)
        .await;

    assert_eq!(
        wiring.scheduler.start(requester(1), handle(1)).await,
        TimerStart::Started
    );
    tokio::time::sleep(default_timeout() + Duration::from_secs(1)).await;

    assert_eq!(
        wiring.cleanup.cleaned().expect("cleanup lock"),
        vec![(requester(1), handle(1))]
    );
    assert_eq!(
        service.session_status(requester(1)).await,
        SessionStatus::Unassigned
    );
    assert_eq!(
        service.session_status(requester(2)).await,
        SessionStatus::Assigned
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn returning_requester_keeps_specialist_after_cancel() {
    let wiring = wire(default_timeout());
    let service = &wiring.service;
    service
        .upsert_specialist(specialist(1), subjects([Subject::Math]))
        .await;
    service
        .request_match(requester(1), handle(1), Subject::Math)
        .await;

    wiring.scheduler.start(requester(1), handle(1)).await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(wiring.scheduler.cancel(requester(1)).await);
    tokio::time::sleep(default_timeout()).await;

    assert!(wiring.cleanup.cleaned().expect("cleanup lock").is_empty());
    assert!(service.is_busy(specialist(1)).await.expect("registered"));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn reclaimed_requester_can_ask_again() {
    let wiring = wire(Duration::from_secs(30));
    let service = &wiring.service;
    service
        .upsert_specialist(specialist(1), subjects([Subject::Math]))
        .await;
    service
        .request_match(requester(1), handle(1), Subject::Math)
        .await;

    wiring.scheduler.start(requester(1), handle(1)).await;
    tokio::time::sleep(Duration::from_secs(31)).await;

    let outcome = service
        .request_match(requester(1), handle(1), Subject::Math)
        .await;
    assert_eq!(outcome, MatchOutcome::Matched(specialist(1)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn queued_requester_timing_out_leaves_queue() {
    let wiring = wire(Duration::from_secs(30));
    let service = &wiring.service;
    service
        .request_match(requester(1), handle(1), Subject::Chemistry)
        .await;

    wiring.scheduler.start(requester(1), handle(1)).await;
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert!(service.pending_requests().await.is_empty());
    assert!(!wiring.scheduler.is_pending(requester(1)).await);
}
