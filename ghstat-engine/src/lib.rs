//! ghstat Engine
//!
//! Runs the gathering workflow for a set of Greenhouse roles.
//!
//! Architecture:
//! - Taskmaster: ordered, fail-fast pipeline of named tasks with progress
//! - Scheduler: bounded concurrent population of roles from a remote source
//! - Formatter: renders the gathered roles (pretty, markdown, json)
//! - Manager: wires the login, processing and output tasks together
//!
//! Only the processing task runs work concurrently; the pipeline itself is
//! strictly sequential.

pub mod context;
pub mod error;
pub mod formatter;
pub mod manager;
pub mod reporter;
pub mod scheduler;
pub mod taskmaster;

pub use context::EngineContext;
pub use error::EngineError;
pub use formatter::{Formatter, OutputFormat};
pub use manager::{Manager, ManagerConfig};
pub use scheduler::{DEFAULT_MAX_CONCURRENCY, Populator, Scheduler};
pub use taskmaster::{Task, TaskCtl, Taskmaster};
