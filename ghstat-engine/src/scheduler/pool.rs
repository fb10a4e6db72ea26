//! Bounded worker pool
//!
//! Spawns one worker per role, gated by a semaphore so that at most
//! `max_concurrency` roles are populated at the same time. Results come back
//! in input order regardless of completion order.

use chrono::{Local, NaiveDate};
use ghstat_client::RemoteDataSource;
use ghstat_core::domain::field::FIELDS_PER_ROLE;
use ghstat_core::domain::role::Role;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::Populator;
use crate::error::EngineError;
use crate::taskmaster::TaskCtl;

/// Maximum number of roles populated at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Populates many roles concurrently
pub struct Scheduler {
    source: Arc<dyn RemoteDataSource>,
    populator: Populator,
    max_concurrency: usize,
}

impl Scheduler {
    /// Creates a scheduler with the default concurrency, dated today
    pub fn new(source: Arc<dyn RemoteDataSource>) -> Self {
        let populator = Populator::new(Arc::clone(&source), Local::now().date_naive());
        Self {
            source,
            populator,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Sets the worker bound; values below one are treated as one
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Resolves date-relative queries against `today` instead of the current date
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.populator = Populator::new(Arc::clone(&self.source), today);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Populates `roles`, reporting progress on the task handle
    ///
    /// Progress ends at 100 once every worker has finished, including when
    /// there are no roles.
    pub async fn run(&self, roles: Vec<Role>, ctl: &TaskCtl) -> Result<Vec<Role>, EngineError> {
        let progress_ctl = ctl.clone();
        let roles = self
            .run_with_progress(roles, move |done, total| {
                progress_ctl.set_progress(percent(done, total));
            })
            .await?;
        ctl.set_progress(100.0);
        Ok(roles)
    }

    /// Populates `roles`, calling `progress(done, total)` after every lookup
    ///
    /// `total` is the number of roles times the lookups per role. Waits for
    /// every worker before returning, even when one of them failed.
    pub async fn run_with_progress<P>(
        &self,
        roles: Vec<Role>,
        progress: P,
    ) -> Result<Vec<Role>, EngineError>
    where
        P: Fn(u64, u64) + Send + Sync + 'static,
    {
        let total = (roles.len() * FIELDS_PER_ROLE) as u64;
        let done = Arc::new(AtomicU64::new(0));
        let progress = Arc::new(progress);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        debug!(
            "populating {} roles with up to {} workers",
            roles.len(),
            self.max_concurrency
        );

        let mut handles = Vec::with_capacity(roles.len());
        for mut role in roles {
            let role_id = role.id();
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| EngineError::WorkerFailed {
                    role_id,
                    reason: e.to_string(),
                })?;

            let populator = self.populator.clone();
            let done = Arc::clone(&done);
            let progress = Arc::clone(&progress);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let inc_progress = move |amount: u64| {
                    let n = done.fetch_add(amount, Ordering::SeqCst) + amount;
                    progress(n, total);
                };
                populator.populate(&mut role, &inc_progress).await;
                role
            });
            handles.push((role_id, handle));
        }

        let mut populated = Vec::with_capacity(handles.len());
        let mut failure = None;
        for (role_id, handle) in handles {
            match handle.await {
                Ok(role) => populated.push(role),
                Err(e) => {
                    warn!("worker for role {} did not finish: {}", role_id, e);
                    failure.get_or_insert(EngineError::WorkerFailed {
                        role_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(populated),
        }
    }
}

fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 * 100.0 / total as f64
    }
}
