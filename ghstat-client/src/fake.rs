//! In-memory data source
//!
//! Stands in for Greenhouse in tests and dry runs. Every count lookup returns
//! the same configured value and titles are `Role <id>`. Failures, latency and
//! concurrency are configurable so callers can exercise degraded paths.

use async_trait::async_trait;
use ghstat_core::query::QuerySpec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::RemoteDataSource;
use crate::error::{ClientError, Result};

/// Fake remote source with instrumentation
#[derive(Debug, Default)]
pub struct FakeDataSource {
    count: u64,
    fail_title: bool,
    failing_keys: Vec<(String, String)>,
    login_error: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeDataSource {
    /// Source answering every count lookup with `count`
    pub fn new(count: u64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Make every title lookup fail
    pub fn with_title_failure(mut self) -> Self {
        self.fail_title = true;
        self
    }

    /// Fail count lookups whose query contains `key=value`
    pub fn with_failing_query(mut self, key: &str, value: &str) -> Self {
        self.failing_keys.push((key.to_string(), value.to_string()));
        self
    }

    /// Make `login` fail with the given reason
    pub fn with_login_failure(mut self, reason: &str) -> Self {
        self.login_error = Some(reason.to_string());
        self
    }

    /// Sleep this long inside every lookup
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Total title and count lookups served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of lookups that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        guard
    }
}

/// Decrements the in-flight counter on drop
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteDataSource for FakeDataSource {
    async fn login(&self) -> Result<()> {
        match &self.login_error {
            Some(reason) => Err(ClientError::NotAuthenticated(reason.clone())),
            None => Ok(()),
        }
    }

    async fn fetch_title(&self, role_id: u64) -> Result<String> {
        let _guard = self.enter().await;
        if self.fail_title {
            return Err(ClientError::MissingElement(".nav-title".into()));
        }
        Ok(format!("Role {}", role_id))
    }

    async fn fetch_count(&self, _role_id: u64, query: &QuerySpec) -> Result<u64> {
        let _guard = self.enter().await;
        let failing = self
            .failing_keys
            .iter()
            .any(|(k, v)| query.get(k).is_some_and(|actual| actual == v));
        if failing {
            return Err(ClientError::MissingElement("#results_count".into()));
        }
        Ok(self.count)
    }
}
