//! Role populator
//!
//! Fills in a role's title and every gathered field, one remote lookup at a
//! time. Lookup failures never abort population: a failed title stays empty
//! and a failed field reads as zero, both flagged on the role.

use chrono::NaiveDate;
use ghstat_client::RemoteDataSource;
use ghstat_core::domain::field::{Field, field_queries};
use ghstat_core::domain::role::Role;
use ghstat_core::query::QuerySpec;
use std::sync::Arc;
use tracing::debug;

/// Populates roles from a remote source
#[derive(Clone)]
pub struct Populator {
    source: Arc<dyn RemoteDataSource>,
    queries: Arc<[(Field, QuerySpec)]>,
}

impl Populator {
    /// Creates a populator whose date-relative queries are resolved against `today`
    pub fn new(source: Arc<dyn RemoteDataSource>, today: NaiveDate) -> Self {
        Self {
            source,
            queries: field_queries(today).into(),
        }
    }

    /// Populates `role`, calling `inc_progress(1)` after every lookup
    ///
    /// `inc_progress` is called exactly once per field plus once for the
    /// title, whether or not the lookup succeeded.
    pub async fn populate(&self, role: &mut Role, inc_progress: &(dyn Fn(u64) + Send + Sync)) {
        match self.source.fetch_title(role.id()).await {
            Ok(title) => role.set_title(title),
            Err(e) => {
                debug!("failed to fetch title for role {}: {}", role.id(), e);
                role.fail_title();
            }
        }
        inc_progress(1);

        for (field, query) in self.queries.iter() {
            match self.source.fetch_count(role.id(), query).await {
                Ok(count) => role.record(*field, count),
                Err(e) => {
                    debug!("failed to fetch {} for role {}: {}", field, role.id(), e);
                    role.record_failure(*field);
                }
            }
            inc_progress(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghstat_client::fake::FakeDataSource;
    use ghstat_core::domain::field::FIELDS_PER_ROLE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn test_populate_fills_every_field() {
        let source = Arc::new(FakeDataSource::new(17));
        let populator = Populator::new(source.clone(), today());
        let steps = AtomicUsize::new(0);

        let mut role = Role::new(42, "Joe Bloggs");
        populator
            .populate(&mut role, &|amount: u64| {
                steps.fetch_add(amount as usize, Ordering::SeqCst);
            })
            .await;

        assert_eq!(role.title(), "Role 42");
        for field in Field::ALL {
            assert_eq!(role.count(field), 17);
            assert!(!role.is_degraded(field));
        }
        assert_eq!(steps.load(Ordering::SeqCst), FIELDS_PER_ROLE);
        assert_eq!(source.calls(), FIELDS_PER_ROLE);
    }

    #[tokio::test]
    async fn test_populate_absorbs_failures() {
        let source = Arc::new(
            FakeDataSource::new(4)
                .with_title_failure()
                .with_failing_query("in_stages[]", "Hold"),
        );
        let populator = Populator::new(source, today());
        let steps = AtomicUsize::new(0);

        let mut role = Role::new(7, "Ann");
        populator
            .populate(&mut role, &|amount: u64| {
                steps.fetch_add(amount as usize, Ordering::SeqCst);
            })
            .await;

        assert_eq!(role.title(), "");
        assert!(role.title_failed());
        assert_eq!(role.count(Field::WiGrading), 0);
        assert!(role.is_degraded(Field::WiGrading));
        assert_eq!(role.count(Field::WiScreening), 4);
        assert_eq!(
            role.degraded_fields().collect::<Vec<_>>(),
            vec![Field::WiGrading]
        );
        assert_eq!(steps.load(Ordering::SeqCst), FIELDS_PER_ROLE);
    }
}
