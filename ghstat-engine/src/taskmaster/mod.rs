//! Taskmaster
//!
//! A sequential pipeline of named tasks. Each task wraps a unit of async work
//! and tracks its own status, message and progress; the taskmaster runs them
//! in insertion order and stops at the first failure.

mod pipeline;
mod task;

pub use pipeline::Taskmaster;
pub use task::{Task, TaskCtl, TaskFuture, TaskWork};
