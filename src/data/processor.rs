//! Data Processor Module
//! Derives progressively smaller tables from the loaded listings (borough filter, value cleaning, group restriction).

use crate::data::{GroupKey, Listing, ValueField};
use std::collections::HashSet;
use tracing::debug;

/// Result of dropping rows with an unusable value.
#[derive(Debug, Clone, Default)]
pub struct Cleaned {
    pub rows: Vec<Listing>,
    pub dropped: usize,
}

/// Handles row selection over listing tables. Inputs are never modified.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep listings whose borough matches, ignoring case and surrounding whitespace.
    pub fn filter_by_borough(rows: &[Listing], borough: &str) -> Vec<Listing> {
        let wanted = borough.trim();
        let filtered: Vec<Listing> = rows
            .iter()
            .filter(|row| {
                row.borough
                    .as_deref()
                    .is_some_and(|b| b.trim().eq_ignore_ascii_case(wanted))
            })
            .cloned()
            .collect();

        debug!(
            "Borough filter '{}': {} of {} rows kept",
            wanted,
            filtered.len(),
            rows.len()
        );
        filtered
    }

    /// Keep only listings with a finite, non-null value for `field`.
    pub fn clean_values(rows: &[Listing], field: ValueField) -> Cleaned {
        let kept: Vec<Listing> = rows
            .iter()
            .filter(|row| row.valid_value(field).is_some())
            .cloned()
            .collect();
        let dropped = rows.len() - kept.len();

        debug!("Cleaning {}: dropped {} rows", field, dropped);
        Cleaned {
            rows: kept,
            dropped,
        }
    }

    /// Keep listings belonging to one of `groups`.
    pub fn restrict_to_groups(rows: &[Listing], key: GroupKey, groups: &[String]) -> Vec<Listing> {
        let wanted: HashSet<&str> = groups.iter().map(String::as_str).collect();
        rows.iter()
            .filter(|row| row.group(key).is_some_and(|g| wanted.contains(g)))
            .cloned()
            .collect()
    }
}
