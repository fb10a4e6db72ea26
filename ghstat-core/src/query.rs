//! Query specifications
//!
//! A query specification is the set of URL query parameters that narrows the
//! candidate listing of a role down to the candidates counted by one field.

use std::collections::BTreeMap;

/// Parameter name to parameter value
///
/// Ordered so that generated URLs are deterministic.
pub type QuerySpec = BTreeMap<String, String>;

/// Builds a query specification from static pairs
pub fn query_spec<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> QuerySpec {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
