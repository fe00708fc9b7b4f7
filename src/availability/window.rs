//! Time-of-day windows and the service-hours set built from them.

use super::AvailabilityError;
use chrono::NaiveTime;
use std::fmt;

/// A closed time-of-day interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ServiceWindow {
    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvertedWindow`] when `end` precedes
    /// `start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, AvailabilityError> {
        if end < start {
            return Err(AvailabilityError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a window from `HH:MM` (or `HH:MM:SS`) strings.
    ///
    /// `24:00` is accepted as an end bound meaning the last instant of the day.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidTime`] for malformed times and
    /// [`AvailabilityError::InvertedWindow`] when `end` precedes `start`.
    pub fn parse(start: &str, end: &str) -> Result<Self, AvailabilityError> {
        let start_time = parse_time_of_day(start)?;
        let end_time = if end.trim() == "24:00" {
            end_of_day()
        } else {
            parse_time_of_day(end)?
        };
        Self::new(start_time, end_time)
    }

    /// Returns the first instant of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the last instant of the window.
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns whether `time` lies inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

impl fmt::Display for ServiceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Ordered, disjoint service windows, or no restriction at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceHours {
    windows: Option<Vec<ServiceWindow>>,
}

impl ServiceHours {
    /// Service hours that never close.
    #[must_use]
    pub const fn always_open() -> Self {
        Self { windows: None }
    }

    /// Builds service hours from windows in any order.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::EmptyServiceHours`] for an empty list and
    /// [`AvailabilityError::OverlappingWindows`] when two windows share an
    /// instant.
    pub fn from_windows(
        windows: impl IntoIterator<Item = ServiceWindow>,
    ) -> Result<Self, AvailabilityError> {
        let mut ordered: Vec<ServiceWindow> = windows.into_iter().collect();
        if ordered.is_empty() {
            return Err(AvailabilityError::EmptyServiceHours);
        }
        ordered.sort_by_key(ServiceWindow::start);
        for pair in ordered.windows(2) {
            if let [earlier, later] = pair
                && later.start <= earlier.end
            {
                return Err(AvailabilityError::OverlappingWindows(later.start));
            }
        }
        Ok(Self {
            windows: Some(ordered),
        })
    }

    /// Returns the configured windows; `None` means always open.
    #[must_use]
    pub fn windows(&self) -> Option<&[ServiceWindow]> {
        self.windows.as_deref()
    }

    /// Returns whether `time` falls inside any window.
    #[must_use]
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        self.windows
            .as_ref()
            .is_none_or(|windows| windows.iter().any(|window| window.contains(time)))
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
///
/// # Errors
///
/// Returns [`AvailabilityError::InvalidTime`] when neither layout matches.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, AvailabilityError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| AvailabilityError::InvalidTime(value.to_owned()))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}
