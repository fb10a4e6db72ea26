//! Pipeline
//!
//! Runs tasks one after another in insertion order. Execution stops at the
//! first failing task; tasks after it stay `Ready`. Calling `execute` again
//! skips tasks that already succeeded and retries from the failed one.

use anyhow::{Context, Result};
use ghstat_core::domain::task::TaskReport;
use tracing::debug;

use super::Task;
use crate::context::EngineContext;

/// Ordered collection of tasks
pub struct Taskmaster {
    tasks: Vec<Task>,
    context: EngineContext,
}

impl Taskmaster {
    pub fn new(context: EngineContext) -> Self {
        Self {
            tasks: Vec::new(),
            context,
        }
    }

    /// Appends a task, inheriting the pipeline's display options
    pub fn add_task(&mut self, mut task: Task) {
        task.attach(self.context.verbose(), self.context.reporter());
        self.tasks.push(task);
    }

    /// Runs every task that has not yet succeeded, in order
    pub async fn execute(&self) -> Result<()> {
        for task in &self.tasks {
            task.execute()
                .await
                .with_context(|| format!("{} step failed", task.name()))?;
        }
        debug!("pipeline finished with {} steps", self.tasks.len());
        Ok(())
    }

    /// Continues a pipeline after a failure
    pub async fn resume(&self) -> Result<()> {
        self.execute().await
    }

    /// Snapshot of every task in insertion order
    pub fn tasks(&self) -> Vec<TaskReport> {
        self.tasks.iter().map(Task::report).collect()
    }
}
