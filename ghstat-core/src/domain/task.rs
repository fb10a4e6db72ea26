//! Task status types
//!
//! Shared between the engine (which drives tasks) and anything that wants to
//! display or assert on pipeline progress.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a pipeline task
///
/// `Ready -> Started -> Succeeded | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Ready,
    Started,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Ready => "Ready",
            TaskStatus::Started => "Started",
            TaskStatus::Succeeded => "Succeeded",
            TaskStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub name: String,
    pub status: TaskStatus,
    pub message: String,
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(TaskStatus::Succeeded.to_string(), "Succeeded");
    }
}
