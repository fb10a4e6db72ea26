//! Scheduler layer for the engine
//!
//! Populates roles from the remote source with a bounded number of workers.
//! Each role is filled in by a single worker, one lookup at a time; the bound
//! limits how many roles are in flight at once.

pub mod pool;
pub mod populator;

pub use pool::{DEFAULT_MAX_CONCURRENCY, Scheduler};
pub use populator::Populator;
