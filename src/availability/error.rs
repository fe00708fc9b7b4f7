//! Error types for service-hours configuration.

use chrono::NaiveTime;
use thiserror::Error;

/// Errors returned while building service windows or gates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    /// A time-of-day string is not `HH:MM` or `HH:MM:SS`.
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    /// A window ends before it starts; cross-midnight windows must be split.
    #[error("service window {start}-{end} ends before it starts")]
    InvertedWindow {
        /// Window start.
        start: NaiveTime,
        /// Window end.
        end: NaiveTime,
    },

    /// Two windows share at least one instant.
    #[error("service windows overlap at {0}")]
    OverlappingWindows(NaiveTime),

    /// An explicit window list was given but it is empty.
    #[error("service hours must contain at least one window")]
    EmptyServiceHours,

    /// The reference timezone is not a known IANA name.
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
}
