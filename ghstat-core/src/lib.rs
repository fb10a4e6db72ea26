//! ghstat Core
//!
//! Core types shared by the ghstat crates.
//!
//! This crate contains:
//! - Domain types: roles, the fixed set of gathered fields, task status
//! - Query specifications used to request a single field from Greenhouse

pub mod domain;
pub mod query;
