//! Role domain type
//!
//! A role is one requisition in Greenhouse together with the statistics
//! gathered for it.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use super::field::Field;

/// Gathered statistics for a single requisition
///
/// Created with only its id and lead, then filled in by exactly one populate
/// call. Fields whose lookup failed read as zero and are listed in
/// [`Role::degraded_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    id: u64,
    lead: String,
    title: String,
    title_failed: bool,
    fields: BTreeMap<Field, u64>,
    degraded: BTreeSet<Field>,
}

impl Role {
    /// Creates an unpopulated role
    pub fn new(id: u64, lead: impl Into<String>) -> Self {
        Self {
            id,
            lead: lead.into(),
            title: String::new(),
            title_failed: false,
            fields: BTreeMap::new(),
            degraded: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn lead(&self) -> &str {
        &self.lead
    }

    /// Requisition title, empty when it has not been (or could not be) fetched
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the title lookup failed
    pub fn title_failed(&self) -> bool {
        self.title_failed
    }

    /// Value of a field; zero when absent or degraded
    pub fn count(&self, field: Field) -> u64 {
        self.fields.get(&field).copied().unwrap_or(0)
    }

    /// Recorded field values
    pub fn fields(&self) -> &BTreeMap<Field, u64> {
        &self.fields
    }

    /// Whether `field` was recorded as zero because its lookup failed
    pub fn is_degraded(&self, field: Field) -> bool {
        self.degraded.contains(&field)
    }

    pub fn degraded_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.degraded.iter().copied()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.title_failed = false;
    }

    /// Marks the title lookup as failed, leaving the title empty
    pub fn fail_title(&mut self) {
        self.title.clear();
        self.title_failed = true;
    }

    pub fn record(&mut self, field: Field, count: u64) {
        self.fields.insert(field, count);
        self.degraded.remove(&field);
    }

    /// Records a failed lookup as zero
    pub fn record_failure(&mut self, field: Field) {
        self.fields.insert(field, 0);
        self.degraded.insert(field);
    }
}

/// Sorts roles for output: ascending by lead, then descending by app reviews
///
/// The sort is stable, so roles that compare equal keep their input order.
pub fn sort_for_output(roles: &mut [Role]) {
    roles.sort_by(|a, b| {
        a.lead
            .cmp(&b.lead)
            .then_with(|| b.count(Field::AppReviews).cmp(&a.count(Field::AppReviews)))
    });
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleRecord<'a> {
    id: u64,
    title: &'a str,
    lead: &'a str,
    app_reviews: u64,
    needs_decision: u64,
    needs_scheduling: u64,
    wi_screening: u64,
    wi_grading: u64,
    stale: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    degraded_fields: Vec<Field>,
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RoleRecord {
            id: self.id,
            title: &self.title,
            lead: &self.lead,
            app_reviews: self.count(Field::AppReviews),
            needs_decision: self.count(Field::NeedsDecision),
            needs_scheduling: self.count(Field::NeedsScheduling),
            wi_screening: self.count(Field::WiScreening),
            wi_grading: self.count(Field::WiGrading),
            stale: self.count(Field::Stale),
            degraded_fields: self.degraded.iter().copied().collect(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(lead: &str, id: u64, reviews: u64) -> Role {
        let mut r = Role::new(id, lead);
        r.record(Field::AppReviews, reviews);
        r
    }

    #[test]
    fn test_new_role_is_empty() {
        let r = Role::new(666, "Joe Bloggs");
        assert_eq!(r.id(), 666);
        assert_eq!(r.lead(), "Joe Bloggs");
        assert_eq!(r.title(), "");
        assert!(r.fields().is_empty());
        assert_eq!(r.count(Field::Stale), 0);
    }

    #[test]
    fn test_record_failure_reads_as_zero() {
        let mut r = Role::new(1, "A");
        r.record(Field::Stale, 4);
        r.record_failure(Field::Stale);
        assert_eq!(r.count(Field::Stale), 0);
        assert!(r.is_degraded(Field::Stale));

        r.record(Field::Stale, 2);
        assert!(!r.is_degraded(Field::Stale));
    }

    #[test]
    fn test_sort_by_lead_then_reviews_desc() {
        let mut roles = vec![role("B", 1, 5), role("A", 2, 1), role("A", 3, 9)];
        sort_for_output(&mut roles);
        let order: Vec<(&str, u64)> = roles
            .iter()
            .map(|r| (r.lead(), r.count(Field::AppReviews)))
            .collect();
        assert_eq!(order, vec![("A", 9), ("A", 1), ("B", 5)]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut roles = vec![role("A", 3, 2), role("A", 1, 2), role("A", 2, 2)];
        sort_for_output(&mut roles);
        let ids: Vec<u64> = roles.iter().map(Role::id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_role_json() {
        let mut r = Role::new(666, "Steve Jobs");
        r.set_title("Fake Role");
        for field in Field::ALL {
            r.record(field, 17);
        }

        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"id":666,"title":"Fake Role","lead":"Steve Jobs","appReviews":17,"needsDecision":17,"needsScheduling":17,"wiScreening":17,"wiGrading":17,"stale":17}"#
        );
    }

    #[test]
    fn test_role_json_lists_degraded_fields() {
        let mut r = Role::new(1, "A");
        r.record_failure(Field::WiGrading);
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["degradedFields"], serde_json::json!(["wiGrading"]));
        assert_eq!(value["wiGrading"], 0);
    }
}
