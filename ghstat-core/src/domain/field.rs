//! Gathered fields
//!
//! Every role is described by the same fixed set of numeric fields. Each field
//! is fetched independently by requesting the role's candidate listing with a
//! field-specific query.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query::{QuerySpec, query_spec};

/// Number of remote lookups needed to populate one role (all fields + title)
pub const FIELDS_PER_ROLE: usize = Field::ALL.len() + 1;

/// Candidates with no activity for this many days are considered stale
pub const STALE_AFTER_DAYS: u64 = 7;

/// One statistic gathered per role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Applications waiting for review
    AppReviews,
    /// Candidates waiting on a decision from the hiring lead
    NeedsDecision,
    /// Interviews to schedule where the candidate already sent availability
    NeedsScheduling,
    /// Written interviews waiting for the initial screen
    WiScreening,
    /// Written interviews on hold waiting for grading
    WiGrading,
    /// Candidates without activity in the last week
    Stale,
}

impl Field {
    /// All fields, in table column order
    pub const ALL: [Field; 6] = [
        Field::AppReviews,
        Field::NeedsDecision,
        Field::NeedsScheduling,
        Field::WiScreening,
        Field::WiGrading,
        Field::Stale,
    ];

    /// Stable identifier used in JSON output and logs
    pub fn key(self) -> &'static str {
        match self {
            Field::AppReviews => "appReviews",
            Field::NeedsDecision => "needsDecision",
            Field::NeedsScheduling => "needsScheduling",
            Field::WiScreening => "wiScreening",
            Field::WiGrading => "wiGrading",
            Field::Stale => "stale",
        }
    }

    /// Column header used by the table formatters
    pub fn header(self) -> &'static str {
        match self {
            Field::AppReviews => "CVs",
            Field::NeedsDecision => "Decisions",
            Field::NeedsScheduling => "Scheduling",
            Field::WiScreening => "WI (Screen)",
            Field::WiGrading => "WI (Grade)",
            Field::Stale => "Stale",
        }
    }

    /// Query parameters selecting the candidates counted by this field
    ///
    /// `today` anchors the stale window.
    pub fn query(self, today: NaiveDate) -> QuerySpec {
        match self {
            Field::AppReviews => query_spec([("in_stages[]", "Application Review")]),
            Field::NeedsDecision => query_spec([("needs_decision", "1")]),
            Field::NeedsScheduling => query_spec([
                ("interview_status_id[]", "1"),
                ("availability_state", "received"),
            ]),
            Field::WiScreening => query_spec([
                ("take_home_test_status_id[]", "9"),
                ("in_stages[]", "Written Interview"),
                ("stage_status_id[]", "2"),
            ]),
            Field::WiGrading => query_spec([
                ("take_home_test_status_id[]", "9"),
                ("in_stages[]", "Hold"),
                ("stage_status_id[]", "2"),
            ]),
            Field::Stale => {
                let cutoff = today
                    .checked_sub_days(Days::new(STALE_AFTER_DAYS))
                    .unwrap_or(today);
                let cutoff = cutoff.format("%Y/%m/%d").to_string();
                query_spec([("last_activity_end", cutoff.as_str())])
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Query table for every field, resolved against a single date
pub fn field_queries(today: NaiveDate) -> Vec<(Field, QuerySpec)> {
    Field::ALL.iter().map(|f| (*f, f.query(today))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_per_role_counts_title() {
        assert_eq!(FIELDS_PER_ROLE, 7);
    }

    #[test]
    fn test_field_keys_are_unique() {
        let mut keys: Vec<_> = Field::ALL.iter().map(|f| f.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Field::ALL.len());
    }

    #[test]
    fn test_stale_query_uses_last_week() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let query = Field::Stale.query(today);
        assert_eq!(
            query.get("last_activity_end").map(String::as_str),
            Some("2024/02/27")
        );
    }

    #[test]
    fn test_wi_queries_differ_by_stage() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let screening = Field::WiScreening.query(today);
        let grading = Field::WiGrading.query(today);
        assert_ne!(screening, grading);
        assert_eq!(
            grading.get("in_stages[]").map(String::as_str),
            Some("Hold")
        );
    }

    #[test]
    fn test_field_queries_cover_all_fields() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let queries = field_queries(today);
        let fields: Vec<Field> = queries.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, Field::ALL.to_vec());
    }

    #[test]
    fn test_field_serializes_as_key() {
        let json = serde_json::to_string(&Field::NeedsScheduling).unwrap();
        assert_eq!(json, "\"needsScheduling\"");
    }
}
