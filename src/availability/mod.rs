//! Service-hours gating for new match requests.
//!
//! A gate holds ordered, disjoint time-of-day windows in a reference
//! timezone and answers whether "now" (from a [`mockable::Clock`]) falls
//! inside one of them. Windows never wrap past midnight; callers split
//! overnight hours into two windows.

mod error;
mod gate;
mod window;

pub use error::AvailabilityError;
pub use gate::AvailabilityGate;
pub use window::{ServiceHours, ServiceWindow, parse_time_of_day};
