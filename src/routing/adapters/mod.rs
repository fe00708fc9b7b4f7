//! Adapter implementations for routing ports.

pub mod memory;

mod file;

pub use file::{DEFAULT_SNAPSHOT_FILE, JsonFileStateStore};
