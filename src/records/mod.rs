//! Record types produced by the extractor
//!
//! Summary records come from listing pages, detail records from each project's
//! own page. Both flatten to rectangular table rows through
//! [`TableRow`](crate::output::TableRow).

mod detail;
mod summary;

pub use detail::{Attribute, DetailRecord, DETAIL_COLUMNS};
pub use summary::{SummaryRecord, SUMMARY_COLUMNS};

use std::collections::HashSet;
use std::hash::Hash;

/// Table cell written for a value absent on the source page
pub const MISSING: &str = "";

/// Cell spellings treated as the missing sentinel when a table is read back
const NULL_LIKE: &[&str] = &["", "nan", "NaN", "NAN", "None", "none", "null", "NULL", "NA", "N/A"];

/// Returns true if a cell value stands for a missing value
pub fn is_null_like(value: &str) -> bool {
    NULL_LIKE.contains(&value.trim())
}

/// Coerces null-like cells to the missing sentinel
pub fn normalize_cell(value: &str) -> String {
    if is_null_like(value) {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

/// Renders an optional value as a table cell
pub fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| MISSING.to_string())
}

/// Removes exact duplicates, keeping the first occurrence of each item
///
/// The surviving items keep their relative order.
pub fn dedup_records<T: Eq + Hash + Clone>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect()
}
