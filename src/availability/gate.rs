//! Time-of-day gate consulted before new matches.

use super::{AvailabilityError, ServiceHours};
use chrono::NaiveTime;
use chrono_tz::Tz;
use mockable::Clock;

/// Reports whether the service is currently taking new requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityGate {
    hours: ServiceHours,
    timezone: Tz,
}

impl AvailabilityGate {
    /// Creates a gate evaluating `hours` in `timezone`.
    #[must_use]
    pub const fn new(hours: ServiceHours, timezone: Tz) -> Self {
        Self { hours, timezone }
    }

    /// Creates a gate that never closes.
    #[must_use]
    pub const fn always_open() -> Self {
        Self::new(ServiceHours::always_open(), Tz::UTC)
    }

    /// Creates a gate from an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::UnknownTimezone`] when the name does not
    /// parse.
    pub fn with_timezone_name(hours: ServiceHours, timezone: &str) -> Result<Self, AvailabilityError> {
        let tz = timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| AvailabilityError::UnknownTimezone(timezone.to_owned()))?;
        Ok(Self::new(hours, tz))
    }

    /// Returns the configured service hours.
    #[must_use]
    pub const fn hours(&self) -> &ServiceHours {
        &self.hours
    }

    /// Returns the reference timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Current time of day in the reference timezone.
    #[must_use]
    pub fn time_of_day_now(&self, clock: &impl Clock) -> NaiveTime {
        clock.utc().with_timezone(&self.timezone).time()
    }

    /// Returns whether the gate is open right now.
    #[must_use]
    pub fn is_open(&self, clock: &impl Clock) -> bool {
        self.hours.is_open_at(self.time_of_day_now(clock))
    }
}

impl Default for AvailabilityGate {
    fn default() -> Self {
        Self::always_open()
    }
}
