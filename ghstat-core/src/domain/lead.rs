//! Hiring leads

use serde::{Deserialize, Serialize};

/// A hiring lead and the requisitions they own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<u64>,
}

impl Lead {
    pub fn new(name: impl Into<String>, roles: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }
}

/// Restricts `leads` to the names listed in `filter`
///
/// An empty filter keeps every lead. Configuration order is preserved.
pub fn filter_leads<'a>(leads: &'a [Lead], filter: &[String]) -> Vec<&'a Lead> {
    leads
        .iter()
        .filter(|lead| filter.is_empty() || filter.iter().any(|name| *name == lead.name))
        .collect()
}

/// Names in `filter` that match no configured lead
pub fn unknown_leads<'a>(leads: &[Lead], filter: &'a [String]) -> Vec<&'a str> {
    filter
        .iter()
        .filter(|name| !leads.iter().any(|lead| lead.name == **name))
        .map(String::as_str)
        .collect()
}
