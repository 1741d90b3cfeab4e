//! Snapshot filters applied between loading and the query layer.
//!
//! Each filter takes the normalized table by reference and returns a new
//! table with the same column set, so downstream missing-column checks
//! behave identically on filtered and unfiltered data.

use schedule_core::models::{ScheduleTable, PLACEHOLDER_TIME};
use schedule_core::{Result, ScheduleError};

/// Preferred display order for the known colleges.
///
/// Colleges outside this list sort alphabetically after it.
pub const COLLEGE_CUSTOM_ORDER: [&str; 8] = [
    "BCB",
    "CSS",
    "CHSE",
    "LAW",
    "SCSM",
    "GEN",
    "SPORT",
    "FOUNDATION",
];

/// Distinct colleges present in the table, in display order.
pub fn college_options(table: &ScheduleTable) -> Vec<String> {
    let present: Vec<&str> = {
        let mut seen = std::collections::HashSet::new();
        table
            .rows
            .iter()
            .filter_map(|r| r.college.as_deref())
            .filter(|c| seen.insert(*c))
            .collect()
    };

    let mut ordered: Vec<String> = COLLEGE_CUSTOM_ORDER
        .iter()
        .filter(|known| present.contains(known))
        .map(|c| c.to_string())
        .collect();

    let mut rest: Vec<String> = present
        .iter()
        .filter(|c| !COLLEGE_CUSTOM_ORDER.contains(c))
        .map(|c| c.to_string())
        .collect();
    rest.sort();

    ordered.extend(rest);
    ordered
}

/// Keep rows belonging to one of the selected colleges.
///
/// Rows without a college never match. An empty selection is a caller
/// error, not an empty result.
pub fn filter_by_colleges(table: &ScheduleTable, colleges: &[String]) -> Result<ScheduleTable> {
    if colleges.is_empty() {
        return Err(ScheduleError::EmptySelection);
    }
    Ok(table.retain_rows(|r| {
        r.college
            .as_deref()
            .map(|c| colleges.iter().any(|sel| sel == c))
            .unwrap_or(false)
    }))
}

/// Drop rows carrying the unscheduled placeholder time.
///
/// Rows with no time at all are kept; only the literal placeholder is
/// filtered.
pub fn exclude_placeholder_times(table: &ScheduleTable) -> ScheduleTable {
    table.retain_rows(|r| r.time.as_deref() != Some(PLACEHOLDER_TIME))
}

/// Keep rows worth exactly `credits` local credits.
pub fn filter_by_credits(table: &ScheduleTable, credits: u32) -> ScheduleTable {
    table.retain_rows(|r| r.kimep_credit == Some(f64::from(credits)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
