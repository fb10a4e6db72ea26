//! Core domain types
//!
//! These types are shared between the client (which fetches the raw values),
//! the engine (which populates and orders roles) and the CLI.

pub mod field;
pub mod lead;
pub mod role;
pub mod task;
