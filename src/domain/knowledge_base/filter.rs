//! Opaque filters passed from the loader through the storage contract

use std::collections::HashMap;

/// Key/value filters used to scope inserts and searches (e.g. tenant partitioning).
///
/// The pipeline never interprets them; backends decide how to store and match.
pub type Filters = HashMap<String, serde_json::Value>;

/// Whether filters recorded on a row satisfy every key/value of a query filter.
///
/// An absent or empty query filter matches every row.
pub fn filters_match(recorded: Option<&Filters>, query: Option<&Filters>) -> bool {
    let Some(query) = query else {
        return true;
    };

    if query.is_empty() {
        return true;
    }

    let Some(recorded) = recorded else {
        return false;
    };

    query
        .iter()
        .all(|(key, value)| recorded.get(key) == Some(value))
}
