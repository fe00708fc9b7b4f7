//! Application services for specialist matching.

mod matching;
mod reclaim;

pub use matching::{MatchingService, MatchingServiceError, MatchingServiceResult};
pub use reclaim::TimeoutReclaimer;
