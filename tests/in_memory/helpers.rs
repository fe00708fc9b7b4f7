//! Shared helpers for in-memory matching integration tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use tutorlink::{
    availability::AvailabilityGate,
    routing::{
        adapters::memory::RecordingNotifier,
        domain::{RequesterId, SessionHandle, SpecialistId, Subject, SubjectSet},
        services::MatchingService,
    },
};

/// Service type wired with recording hooks and the system clock.
pub type TestService = MatchingService<RecordingNotifier, DefaultClock>;

/// Clock that only moves when told to.
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    /// Creates a clock at `hour:minute` UTC on a fixed date.
    ///
    /// # Panics
    ///
    /// Panics when the time is out of range.
    #[must_use]
    pub fn at(hour: u32, minute: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 2, hour, minute, 0)
            .single()
            .expect("valid timestamp");
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock by `delta`.
    ///
    /// # Panics
    ///
    /// Panics when the clock lock is poisoned.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Provides an always-open service over empty state.
#[fixture]
pub fn service() -> TestService {
    service_with(&Arc::new(RecordingNotifier::new()))
}

/// Builds an always-open service reporting to `notifier`.
#[must_use]
pub fn service_with(notifier: &Arc<RecordingNotifier>) -> TestService {
    MatchingService::new(
        AvailabilityGate::always_open(),
        Arc::clone(notifier),
        Arc::new(DefaultClock),
    )
}

/// Builds a specialist identifier.
#[must_use]
pub const fn specialist(raw: u64) -> SpecialistId {
    SpecialistId::new(raw)
}

/// Builds a requester identifier.
#[must_use]
pub const fn requester(raw: u64) -> RequesterId {
    RequesterId::new(raw)
}

/// Builds the channel handle used for a requester in these tests.
#[must_use]
pub const fn handle(raw: u64) -> SessionHandle {
    SessionHandle::new(raw * 100)
}

/// Builds a capability set.
#[must_use]
pub fn subjects<const N: usize>(list: [Subject; N]) -> SubjectSet {
    SubjectSet::from(list)
}
