//! Domain model for tutoring request routing.
//!
//! The routing domain models specialists and their subject capabilities,
//! requester sessions, the queue of unmatched requests, and the matching
//! rules that tie them together. All infrastructure concerns (time sources
//! aside) are kept outside the domain boundary.

mod engine;
mod error;
mod ids;
mod outcome;
mod queue;
mod registry;
mod session;
mod snapshot;
mod specialist;
mod subject;
mod subject_index;

pub use engine::{EngineState, RestoreReport};
pub use error::{ParseSubjectError, RoutingError};
pub use ids::{RequesterId, SessionHandle, SpecialistId};
pub use outcome::{Assignment, DeferralReason, MatchOutcome, ReclaimReport};
pub use queue::{PendingRequest, PendingRequestQueue};
pub use registry::{SpecialistRegistry, UpsertOutcome};
pub use session::{RequesterSession, SessionStatus};
pub use snapshot::{EngineSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use specialist::{Specialist, SpecialistState};
pub use subject::{Subject, SubjectSet};
pub use subject_index::SubjectIndex;
