//! Manager
//!
//! Wires the gathering workflow into a pipeline of three tasks:
//!
//! 1. `login` - establish an authenticated session with the remote source
//! 2. `processing` - build a role per configured requisition and populate them
//! 3. `output` - sort the roles and render them with the chosen formatter
//!
//! Output is written only once every earlier task succeeded.

use anyhow::Context;
use chrono::NaiveDate;
use ghstat_client::RemoteDataSource;
use ghstat_core::domain::lead::{Lead, filter_leads, unknown_leads};
use ghstat_core::domain::role::{Role, sort_for_output};
use ghstat_core::domain::task::TaskReport;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::formatter::{Formatter, OutputFormat};
use crate::scheduler::{DEFAULT_MAX_CONCURRENCY, Scheduler};
use crate::taskmaster::{Task, TaskCtl, Taskmaster};

/// Settings for a single gathering run
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Configured leads and their requisitions
    pub leads: Vec<Lead>,
    /// Lead names to restrict the run to; empty means every lead
    pub filter: Vec<String>,
    /// Output format identifier: `pretty`, `markdown` or `json`
    pub format: String,
    /// Maximum number of roles populated at once
    pub max_concurrency: usize,
    /// Date anchoring date-relative fields; today when unset
    pub today: Option<NaiveDate>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            leads: Vec::new(),
            filter: Vec::new(),
            format: OutputFormat::default().to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            today: None,
        }
    }
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Controls the execution of the gathering workflow
pub struct Manager {
    taskmaster: Taskmaster,
    roles: Arc<Mutex<Vec<Role>>>,
}

impl Manager {
    /// Creates a manager, validating the output format up front
    ///
    /// # Arguments
    /// * `config` - Leads, filter, format and concurrency for this run
    /// * `source` - Remote source roles are populated from
    /// * `writer` - Destination of the rendered output
    /// * `context` - Verbosity and progress display
    pub fn new(
        config: ManagerConfig,
        source: Arc<dyn RemoteDataSource>,
        writer: Box<dyn Write + Send>,
        context: EngineContext,
    ) -> Result<Self, EngineError> {
        let format: OutputFormat = config.format.parse()?;
        let formatter: Arc<dyn Formatter> = Arc::from(format.formatter());

        let mut scheduler =
            Scheduler::new(Arc::clone(&source)).with_max_concurrency(config.max_concurrency);
        if let Some(today) = config.today {
            scheduler = scheduler.with_date(today);
        }

        let roles = Arc::new(Mutex::new(Vec::new()));
        let writer: SharedWriter = Arc::new(Mutex::new(writer));

        let mut taskmaster = Taskmaster::new(context);
        taskmaster.add_task(login_task(source));
        taskmaster.add_task(processing_task(
            Arc::new(config.leads),
            Arc::new(config.filter),
            Arc::new(scheduler),
            Arc::clone(&roles),
        ));
        taskmaster.add_task(output_task(formatter, writer, Arc::clone(&roles)));

        Ok(Self { taskmaster, roles })
    }

    /// Runs the workflow
    pub async fn execute(&self) -> anyhow::Result<()> {
        self.taskmaster.execute().await
    }

    /// Retries the workflow from the first task that did not succeed
    pub async fn resume(&self) -> anyhow::Result<()> {
        self.taskmaster.resume().await
    }

    /// Snapshot of the workflow's tasks
    pub fn tasks(&self) -> Vec<TaskReport> {
        self.taskmaster.tasks()
    }

    /// Roles gathered so far
    pub fn roles(&self) -> Vec<Role> {
        lock(&self.roles).clone()
    }
}

fn login_task(source: Arc<dyn RemoteDataSource>) -> Task {
    Task::new(
        "login",
        "Logging in",
        move |_ctl: TaskCtl| {
            let source = Arc::clone(&source);
            async move {
                source
                    .login()
                    .await
                    .context("failed to login to Greenhouse")?;
                Ok(())
            }
        },
        false,
    )
}

fn processing_task(
    leads: Arc<Vec<Lead>>,
    filter: Arc<Vec<String>>,
    scheduler: Arc<Scheduler>,
    roles: Arc<Mutex<Vec<Role>>>,
) -> Task {
    Task::new(
        "processing",
        "Processing roles",
        move |ctl: TaskCtl| {
            let leads = Arc::clone(&leads);
            let filter = Arc::clone(&filter);
            let scheduler = Arc::clone(&scheduler);
            let roles = Arc::clone(&roles);
            async move {
                if let Some(name) = unknown_leads(&leads, &filter).first() {
                    return Err(anyhow::Error::from(EngineError::UnknownLead(
                        name.to_string(),
                    )));
                }

                let pending: Vec<Role> = filter_leads(&leads, &filter)
                    .into_iter()
                    .flat_map(|lead| {
                        lead.roles
                            .iter()
                            .map(move |id| Role::new(*id, lead.name.as_str()))
                    })
                    .collect();

                ctl.set_message(format!("Processing {} roles", pending.len()));
                debug!("processing {} roles", pending.len());

                let populated = scheduler.run(pending, &ctl).await?;
                *lock(&roles) = populated;
                Ok(())
            }
        },
        false,
    )
}

fn output_task(
    formatter: Arc<dyn Formatter>,
    writer: SharedWriter,
    roles: Arc<Mutex<Vec<Role>>>,
) -> Task {
    Task::new(
        "output",
        "Output",
        move |_ctl: TaskCtl| {
            let formatter = Arc::clone(&formatter);
            let writer = Arc::clone(&writer);
            let roles = Arc::clone(&roles);
            async move { write_output(formatter.as_ref(), &writer, &roles) }
        },
        true,
    )
}

fn write_output(
    formatter: &dyn Formatter,
    writer: &Mutex<Box<dyn Write + Send>>,
    roles: &Mutex<Vec<Role>>,
) -> anyhow::Result<()> {
    let mut roles = lock(roles);
    if roles.is_empty() {
        debug!("no roles gathered, skipping output");
        return Ok(());
    }
    sort_for_output(&mut roles);

    let mut writer = lock(writer);
    formatter
        .render(&roles, &mut **writer)
        .map_err(EngineError::from)?;
    writer.flush().map_err(EngineError::from)?;
    Ok(())
}
