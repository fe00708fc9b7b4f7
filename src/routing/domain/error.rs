//! Error types for routing domain operations and parsing.

use super::{RequesterId, SpecialistId};
use thiserror::Error;

/// Local-fault conditions raised by engine operations.
///
/// None of these leave the engine state partially modified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// No specialist is registered under the identifier.
    #[error("specialist {0} is not registered")]
    SpecialistNotFound(SpecialistId),

    /// No requester session exists for the identifier.
    #[error("no session exists for requester {0}")]
    RequesterNotFound(RequesterId),

    /// The specialist is not currently assigned to the requester.
    #[error("specialist {specialist} is not assigned to requester {requester}")]
    AssignmentNotFound {
        /// Requester whose session was addressed.
        requester: RequesterId,
        /// Specialist expected to be assigned.
        specialist: SpecialistId,
    },

    /// The specialist is busy and cannot take the requested action.
    #[error("specialist {0} is busy")]
    SpecialistBusy(SpecialistId),
}

/// Error returned while parsing a subject name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown subject: {0}")]
pub struct ParseSubjectError(pub String);
