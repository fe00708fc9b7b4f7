//! Tutorlink: tutoring request routing and matching.
//!
//! This crate pairs people asking for help with idle specialists who cover
//! the requested subject. It keeps a registry of specialists, queues requests
//! nobody can take yet, gates new matches on service hours, and reclaims
//! sessions that go quiet.
//!
//! # Architecture
//!
//! Tutorlink follows hexagonal architecture principles:
//!
//! - **Domain**: Pure matching rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and host callbacks
//! - **Adapters**: Concrete implementations of ports (in-memory, JSON file)
//!
//! # Modules
//!
//! - [`routing`]: Specialist registry, request queue, and matching
//! - [`availability`]: Service-hours gate
//! - [`timeout`]: Per-session inactivity countdowns
//! - [`config`]: TOML engine configuration

pub mod availability;
pub mod config;
pub mod routing;
pub mod timeout;
