//! Step definitions for tutoring match scenarios.

mod given;
mod then;
pub mod world;
