//! Substring filtering of queue entries by patient name.

use crate::types::QueueEntry;

/// Whether `entry`'s patient name contains `needle`, ignoring case.
///
/// Matching lowercases both sides, so "ali" finds "Alice" and "ALICIA".
/// An entry without a patient name only matches the empty filter.
pub fn matches_patient_name(entry: &QueueEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    match entry.patient_name.as_deref() {
        Some(name) => name.to_lowercase().contains(&needle.to_lowercase()),
        None => false,
    }
}

/// Keep the entries whose patient name contains `filter_name`, in input order.
///
/// An empty filter returns every entry unchanged.
pub fn filter_entries<'a>(entries: &'a [QueueEntry], filter_name: &str) -> Vec<&'a QueueEntry> {
    entries
        .iter()
        .filter(|entry| matches_patient_name(entry, filter_name))
        .collect()
}
