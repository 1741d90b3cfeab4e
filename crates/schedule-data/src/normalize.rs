//! Per-column type coercion and derived-field computation.
//!
//! Turns a [`RawTable`] of untyped cells into the canonical
//! [`ScheduleTable`] snapshot every aggregation query consumes. Coercion
//! is best-effort: a cell that cannot be coerced becomes null and is
//! counted, never a hard failure. Missing columns never fail
//! normalization either; the snapshot records which columns were present
//! so queries can report missing prerequisites themselves.

use calamine::Data;
use schedule_core::derive::{compute_occupancy_rate, extract_building, extract_course_level};
use schedule_core::models::{ScheduleTable, SectionRecord};
use tracing::warn;

use crate::reader::RawTable;

/// Source columns coerced to text; not-a-value sentinels become null.
pub const TEXT_COLUMNS: [&str; 15] = [
    "Index",
    "Code",
    "Sec.",
    "Title",
    "Days",
    "Days1",
    "Days2",
    "Days3",
    "Days4",
    "Days5",
    "College",
    "Instructor",
    "Time",
    "Hall",
    "Type",
];

/// Source columns coerced to numbers; unparseable cells become null.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "Reg. Stud.",
    "Limit",
    "Hall capacity",
    "Duration",
    "TotalDuration",
    "KIMEP Credit",
    "ECTS Credit",
    "Late Registration",
];

/// Counters describing how the best-effort coercion went.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoercionStats {
    /// Cells in a numeric column that could not be parsed as a number.
    pub numeric_failures: usize,
}

// ── Cell coercion ─────────────────────────────────────────────────────────────

/// Coerce a cell to text, mapping not-a-value sentinels to null.
///
/// Empty cells, error cells, and the literal strings `""`/`"nan"`/`"NaN"`
/// (missing values re-exported as text) all become `None`.
/// Integral floats print without a fractional part so a numeric section
/// index like `1001.0` becomes `"1001"`.
pub fn coerce_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => return None,
    };
    if text.is_empty() || text == "nan" || text == "NaN" {
        None
    } else {
        Some(text)
    }
}

/// Coerce a cell to a number; anything unparseable is `Err(())` so the
/// caller can count the failure.
///
/// Empty and error cells are an ordinary null (`Ok(None)`), not a
/// coercion failure.
pub fn coerce_number(cell: &Data) -> std::result::Result<Option<f64>, ()> {
    match cell {
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::Empty | Data::Error(_) => Ok(None),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "nan" || trimmed == "NaN" {
                Ok(None)
            } else {
                trimmed.parse::<f64>().map(Some).map_err(|_| ())
            }
        }
        _ => Err(()),
    }
}

// ── Normalization ─────────────────────────────────────────────────────────────

/// Normalize a raw sheet into the canonical snapshot.
///
/// Applies the fixed coercion tables, computes every derived field, and
/// runs back-to-back collapsing. The row order of the input is preserved.
pub fn normalize_table(raw: &RawTable) -> (ScheduleTable, CoercionStats) {
    let mut stats = CoercionStats::default();
    let mut rows: Vec<SectionRecord> = Vec::with_capacity(raw.rows.len());

    for row_idx in 0..raw.rows.len() {
        let text = |name: &str| raw.cell(row_idx, name).and_then(coerce_text);
        let mut number = |name: &str| match raw.cell(row_idx, name).map(coerce_number) {
            Some(Ok(value)) => value,
            Some(Err(())) => {
                stats.numeric_failures += 1;
                warn!("Row {}: column '{}' is not numeric, using null", row_idx, name);
                None
            }
            None => None,
        };

        let code = text("Code");
        let hall = text("Hall");
        let hall_capacity = number("Hall capacity");
        let reg_students = number("Reg. Stud.");

        let course_level = extract_course_level(code.as_deref());
        let building = extract_building(hall.as_deref());
        let occupancy_rate = compute_occupancy_rate(reg_students, hall_capacity);

        rows.push(SectionRecord {
            index: text("Index"),
            code,
            title: text("Title"),
            college: text("College"),
            instructor: text("Instructor"),
            days: [
                text("Days1"),
                text("Days2"),
                text("Days3"),
                text("Days4"),
                text("Days5"),
            ],
            time: text("Time"),
            hall,
            hall_capacity,
            reg_students,
            limit: number("Limit"),
            duration: number("Duration"),
            total_duration: number("TotalDuration"),
            section_type: text("Type"),
            late_registration: number("Late Registration"),
            kimep_credit: number("KIMEP Credit"),
            ects_credit: number("ECTS Credit"),
            course_level,
            effective_duration: None,
            duration_suppressed: false,
            building,
            occupancy_rate,
        });
    }

    collapse_duration_samples(&mut rows);

    if stats.numeric_failures > 0 {
        warn!(
            "{} numeric cell(s) failed coercion and were nulled",
            stats.numeric_failures
        );
    }

    (ScheduleTable::new(rows, raw.column_set()), stats)
}

/// Collapse back-to-back paired rows for duration-sample purposes.
///
/// A row is back-to-back when its `Type` contains "back"
/// (case-insensitive). For every code that has at least one back-to-back
/// row, only the first row of that code (in original order) keeps its
/// duration sample; the rest are tagged suppressed. Suppression groups by
/// code text equality alone, not by section index, so a legitimately
/// reused code can be over-suppressed. That is the intended rule.
///
/// Every row also gets its effective duration here: a fixed 150 minutes
/// when the row itself is back-to-back flagged, otherwise its own
/// duration.
pub fn collapse_duration_samples(rows: &mut [SectionRecord]) {
    let paired_codes: std::collections::HashSet<String> = rows
        .iter()
        .filter(|r| r.is_back_to_back())
        .filter_map(|r| r.code.clone())
        .collect();

    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    for row in rows.iter_mut() {
        row.effective_duration = if row.is_back_to_back() {
            Some(150.0)
        } else {
            row.duration
        };

        let in_pair = row
            .code
            .as_ref()
            .map(|c| paired_codes.contains(c))
            .unwrap_or(false);
        if in_pair {
            let code = row.code.clone().unwrap_or_default();
            row.duration_suppressed = !seen.insert(code);
        } else {
            row.duration_suppressed = false;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
