//! Tutoring request routing for tutorlink.
//!
//! This module pairs requesters with idle specialists by subject: the
//! specialist registry and its subject index, requester sessions, the FIFO
//! queue of unmatched requests, and the matching rules that tie them
//! together. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
