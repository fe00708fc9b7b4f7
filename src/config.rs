//! Engine configuration loaded from TOML.
//!
//! ```toml
//! session_timeout_secs = 600
//! timezone = "Europe/London"
//!
//! [[service_hours]]
//! start = "13:00"
//! end = "17:00"
//! ```
//!
//! Omitting `service_hours` leaves the service always open.

use crate::availability::{AvailabilityError, AvailabilityGate, ServiceHours, ServiceWindow};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default inactivity countdown, in seconds.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 600;

/// Default reference timezone for service hours.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Errors returned while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration path does not name a file.
    #[error("config path '{0}' has no file name")]
    InvalidPath(String),

    /// The TOML document is malformed or has unknown keys.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The inactivity timeout is zero.
    #[error("session_timeout_secs must be greater than zero")]
    ZeroTimeout,

    /// Service hours or timezone are invalid.
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

/// One `[[service_hours]]` entry as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceWindowConfig {
    /// Window start, `HH:MM`.
    pub start: String,
    /// Window end, `HH:MM`; `24:00` means end of day.
    pub end: String,
}

/// Runtime settings for the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Inactivity countdown length in seconds.
    pub session_timeout_secs: u64,
    /// IANA timezone the service hours are written in.
    pub timezone: String,
    /// Service windows; `None` means always open.
    pub service_hours: Option<Vec<ServiceWindowConfig>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            timezone: DEFAULT_TIMEZONE.to_owned(),
            service_hours: None,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and the validation
    /// errors of [`EngineConfig::validate`].
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, plus every
    /// error of [`EngineConfig::from_toml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ConfigError::InvalidPath(path.to_string()))?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let read_error = |source| ConfigError::Read {
            path: path.to_string(),
            source,
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let raw = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_toml_str(&raw)
    }

    /// Checks every value without building anything.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for a zero timeout and
    /// [`ConfigError::Availability`] for bad windows or timezone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.availability_gate()?;
        Ok(())
    }

    /// Returns the inactivity countdown length.
    #[must_use]
    pub const fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    /// Builds the availability gate described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Availability`] for malformed, inverted or
    /// overlapping windows, an explicit empty list, or an unknown timezone.
    pub fn availability_gate(&self) -> Result<AvailabilityGate, ConfigError> {
        let hours = match &self.service_hours {
            None => ServiceHours::always_open(),
            Some(windows) => ServiceHours::from_windows(
                windows
                    .iter()
                    .map(|window| ServiceWindow::parse(&window.start, &window.end))
                    .collect::<Result<Vec<_>, _>>()?,
            )?,
        };
        Ok(AvailabilityGate::with_timezone_name(hours, &self.timezone)?)
    }
}
