//! Error types for the engine

use thiserror::Error;

/// Structural errors raised by the engine
///
/// Per-field lookup failures never surface here; they are absorbed while a
/// role is populated.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested output format is not one of the supported ones
    #[error(
        "invalid output formatter '{0}', please choose one of 'pretty', 'markdown' or 'json'"
    )]
    UnknownFormat(String),

    /// The lead filter names leads missing from the configuration
    #[error("no configured lead named {0}")]
    UnknownLead(String),

    /// A role worker panicked or was cancelled
    #[error("worker for role {role_id} failed: {reason}")]
    WorkerFailed { role_id: u64, reason: String },

    /// Rendering the results failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
