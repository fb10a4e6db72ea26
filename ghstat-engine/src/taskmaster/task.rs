//! Task
//!
//! A named unit of work with a status, a human-readable message and a
//! progress percentage. The work function receives a [`TaskCtl`] handle that
//! lets it update the message and progress without access to the task itself.

use anyhow::{Result, bail};
use ghstat_core::domain::task::{TaskReport, TaskStatus};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::reporter::ProgressReporter;

/// Boxed future returned by task work
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Work executed by a task
///
/// Implemented for any `Fn(TaskCtl) -> impl Future<Output = anyhow::Result<()>>`,
/// so closures returning `async move` blocks can be used directly.
pub trait TaskWork: Send + Sync {
    fn run(&self, ctl: TaskCtl) -> TaskFuture;
}

impl<F, Fut> TaskWork for F
where
    F: Fn(TaskCtl) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn run(&self, ctl: TaskCtl) -> TaskFuture {
        Box::pin(self(ctl))
    }
}

#[derive(Debug)]
struct TaskState {
    message: String,
    status: TaskStatus,
    progress: f64,
}

impl TaskState {
    /// Message as shown on the spinner, with progress once there is some
    fn display_message(&self) -> String {
        if self.progress != 0.0 {
            format!("{} ({:.0}%)", self.message, self.progress)
        } else {
            self.message.clone()
        }
    }
}

fn lock(state: &Mutex<TaskState>) -> MutexGuard<'_, TaskState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Handle given to task work for reporting progress
///
/// Cheap to clone and safe to use from concurrent workers.
#[derive(Clone)]
pub struct TaskCtl {
    state: Arc<Mutex<TaskState>>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl TaskCtl {
    /// Sets the progress percentage (0-100)
    pub fn set_progress(&self, progress: f64) {
        let line = {
            let mut state = lock(&self.state);
            state.progress = progress;
            state.display_message()
        };
        if let Some(reporter) = &self.reporter {
            reporter.update(&line);
        }
    }

    /// Replaces the task message
    pub fn set_message(&self, message: impl Into<String>) {
        let line = {
            let mut state = lock(&self.state);
            state.message = message.into();
            state.display_message()
        };
        if let Some(reporter) = &self.reporter {
            reporter.update(&line);
        }
    }
}

/// A named pipeline stage
pub struct Task {
    name: String,
    silent: bool,
    verbose: bool,
    state: Arc<Mutex<TaskState>>,
    work: Box<dyn TaskWork>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl Task {
    /// Creates a task in the `Ready` state
    ///
    /// # Arguments
    /// * `name` - Stable identifier of the task
    /// * `message` - Initial human-readable message
    /// * `work` - The work to run when the task executes
    /// * `silent` - Never show this task on the progress display
    pub fn new<F, Fut>(
        name: impl Into<String>,
        message: impl Into<String>,
        work: F,
        silent: bool,
    ) -> Self
    where
        F: Fn(TaskCtl) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            silent,
            verbose: false,
            state: Arc::new(Mutex::new(TaskState {
                message: message.into(),
                status: TaskStatus::Ready,
                progress: 0.0,
            })),
            work: Box::new(work),
            reporter: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TaskStatus {
        lock(&self.state).status
    }

    /// Snapshot of the task
    pub fn report(&self) -> TaskReport {
        let state = lock(&self.state);
        TaskReport {
            name: self.name.clone(),
            status: state.status,
            message: state.message.clone(),
            progress: state.progress,
        }
    }

    /// Sets presentation options, called when the task joins a pipeline
    pub(crate) fn attach(&mut self, verbose: bool, reporter: Option<Arc<dyn ProgressReporter>>) {
        self.verbose = verbose;
        self.reporter = reporter;
    }

    /// Runs the task
    ///
    /// A task that already succeeded is not run again. A failed task may be
    /// run again; it restarts from zero progress.
    pub async fn execute(&self) -> Result<()> {
        match self.status() {
            TaskStatus::Succeeded => {
                debug!("skipping completed step {}", self.name);
                return Ok(());
            }
            TaskStatus::Started => bail!("step '{}' is already running", self.name),
            TaskStatus::Ready | TaskStatus::Failed => {}
        }

        self.start();

        let ctl = TaskCtl {
            state: Arc::clone(&self.state),
            reporter: self.display(),
        };

        match self.work.run(ctl).await {
            Ok(()) => {
                self.succeed();
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Reporter to draw on, if this task is displayed at all
    fn display(&self) -> Option<Arc<dyn ProgressReporter>> {
        if self.verbose || self.silent {
            None
        } else {
            self.reporter.clone()
        }
    }

    fn start(&self) {
        let line = {
            let mut state = lock(&self.state);
            state.status = TaskStatus::Started;
            state.progress = 0.0;
            state.display_message()
        };
        if self.verbose {
            debug!("started step {}", self.name);
        } else if let Some(reporter) = self.display() {
            reporter.start(&line);
        }
    }

    fn succeed(&self) {
        let message = {
            let mut state = lock(&self.state);
            state.status = TaskStatus::Succeeded;
            state.message.clone()
        };
        if self.verbose {
            debug!("completed step {}", self.name);
        } else if let Some(reporter) = self.display() {
            reporter.succeed(&message);
        }
    }

    fn fail(&self, error: &anyhow::Error) {
        let message = {
            let mut state = lock(&self.state);
            state.status = TaskStatus::Failed;
            state.message.clone()
        };
        if self.verbose {
            debug!("failed step {}: {:#}", self.name, error);
        } else if let Some(reporter) = self.display() {
            reporter.fail(&message);
        }
    }
}
