//! Unit tests for the routing bounded context.


use crate::routing::domain::{SpecialistId, Subject, SubjectSet};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Clock that only moves when told to.
struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn at(hour: u32, minute: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 2, hour, minute, 0)
            .single()
            .expect("valid timestamp");
        Self {
            now: Mutex::new(now),
        }
    }

    fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }

    fn set_time(&self, hour: u32, minute: u32) {
        *self.now.lock().expect("clock lock") = Self::at(hour, minute).utc();
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

fn specialist(raw: u64) -> SpecialistId {
    SpecialistId::new(raw)
}

fn subjects<const N: usize>(list: [Subject; N]) -> SubjectSet {
    SubjectSet::from(list)
}
