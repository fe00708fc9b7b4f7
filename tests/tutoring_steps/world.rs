//! Shared world state for tutoring match BDD scenarios.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use mockable::Clock;
use rstest::fixture;
use tutorlink::{
    availability::{AvailabilityGate, ServiceHours},
    routing::{
        adapters::memory::RecordingNotifier,
        domain::{MatchOutcome, RequesterId, Subject},
        services::MatchingService,
    },
};

/// Service type used by the BDD world.
pub type ScenarioService = MatchingService<RecordingNotifier, ScenarioClock>;

/// Clock whose time of day is set by scenario steps.
pub struct ScenarioClock {
    now: Mutex<DateTime<Utc>>,
}

impl ScenarioClock {
    fn new() -> Self {
        let noon = Utc
            .with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
            .single()
            .unwrap_or_default();
        Self {
            now: Mutex::new(noon),
        }
    }

    /// Moves the clock to `time` on the scenario's date.
    pub fn set_time_of_day(&self, time: NaiveTime) -> Result<(), eyre::Report> {
        let mut now = self
            .now
            .lock()
            .map_err(|err| eyre::eyre!("clock lock poisoned: {err}"))?;
        *now = now.date_naive().and_time(time).and_utc();
        Ok(())
    }

    /// Moves the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) -> Result<(), eyre::Report> {
        *self
            .now
            .lock()
            .map_err(|err| eyre::eyre!("clock lock poisoned: {err}"))? = instant;
        Ok(())
    }
}

impl Clock for ScenarioClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Scenario world for tutoring match behaviour tests.
pub struct TutoringWorld {
    /// Clock shared with the service.
    pub clock: Arc<ScenarioClock>,
    /// Notifier shared with the service.
    pub notifier: Arc<RecordingNotifier>,
    /// Service hours used when the service is first built.
    pub service_hours: ServiceHours,
    /// Outcome of each requester's latest match request.
    pub outcomes: HashMap<RequesterId, MatchOutcome>,
    service: Option<ScenarioService>,
}

impl TutoringWorld {
    /// Creates a world with an always-open gate at noon UTC.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Arc::new(ScenarioClock::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            service_hours: ServiceHours::always_open(),
            outcomes: HashMap::new(),
            service: None,
        }
    }

    /// Returns whether the service has been built.
    #[must_use]
    pub const fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// Returns the service, building it on first use.
    pub fn service(&mut self) -> &ScenarioService {
        let gate = AvailabilityGate::new(self.service_hours.clone(), Tz::UTC);
        let notifier = Arc::clone(&self.notifier);
        let clock = Arc::clone(&self.clock);
        self.service
            .get_or_insert_with(|| MatchingService::new(gate, notifier, clock))
    }

    /// Returns the outcome recorded for `requester`.
    pub fn outcome(&self, requester: u64) -> Result<MatchOutcome, eyre::Report> {
        self.outcomes
            .get(&RequesterId::new(requester))
            .copied()
            .ok_or_else(|| eyre::eyre!("requester {requester} has not asked for help"))
    }
}

impl Default for TutoringWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TutoringWorld {
    TutoringWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a subject name used in feature files.
pub fn parse_subject(raw: &str) -> Result<Subject, eyre::Report> {
    Subject::try_from(raw).map_err(|err| eyre::eyre!("{err}"))
}
