//! Aggregation queries backing the dashboard views.
//!
//! Every query is a pure function of an immutable [`ScheduleTable`]
//! snapshot and returns a small result table. A query whose required
//! source columns are entirely absent fails with
//! [`ScheduleError::MissingColumns`], the "insufficient data" signal,
//! which is distinct from a well-formed empty result. An empty snapshot
//! always yields empty/zero results, never an error.

use std::collections::{HashMap, HashSet};

use schedule_core::derive::{contains_digit, round1};
use schedule_core::models::{CourseLevel, ScheduleTable, SectionRecord, DAY_ORDER};
use schedule_core::{Result, ScheduleError};
use serde::Serialize;

// ── Result types ──────────────────────────────────────────────────────────────

/// Distinct-section counts per course level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelCounts {
    /// Deduped sections with a known level.
    pub total: usize,
    pub foundation: usize,
    pub undergraduate: usize,
    pub graduate: usize,
}

/// Enrollment total and share for one college.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollegeEnrollment {
    pub college: String,
    pub students: f64,
    /// Share of the overall enrollment, one decimal place.
    pub percentage: f64,
}

/// A (course, metric) pair for top-N course rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseMetric {
    pub code: String,
    pub title: String,
    pub value: f64,
}

/// Classes and enrolled students scheduled on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: String,
    /// Number of day-observations (a row meeting on three days counts
    /// three times, once per day).
    pub classes: usize,
    /// Sum of the full `Reg. Stud.` value over those observations.
    pub students: f64,
}

/// Number of classes starting within one hour slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub classes: usize,
}

/// One class-length bucket of the duration distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBucket {
    pub minutes: u32,
    pub count: usize,
    /// Share of all retained in-bucket rows, one decimal place.
    pub percentage: f64,
}

/// Distinct sections per occupancy band.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OccupancyBuckets {
    /// Occupancy below 50%.
    pub under_utilized: usize,
    /// Occupancy in [50, 90).
    pub optimal: usize,
    /// Occupancy at or above 90%.
    pub over_utilized: usize,
}

/// Headline figures for the faculty view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FacultySummary {
    pub total_instructors: usize,
    /// Distinct sections per instructor; `None` when the `Index` column
    /// is absent or there are no instructors.
    pub avg_courses_per_instructor: Option<f64>,
    /// Mean of each instructor's enrollment total; `None` when
    /// `Reg. Stud.` is absent or there are no instructors.
    pub avg_students_per_instructor: Option<f64>,
}

/// A (group key, distinct count) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedCount {
    pub key: String,
    pub count: usize,
}

/// A (group key, summed metric) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedSum {
    pub key: String,
    pub total: f64,
}

/// Room-stock figures for the facilities view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoomMetrics {
    /// Distinct digit-bearing room labels with a numeric capacity.
    pub total_rooms: usize,
    pub min_capacity: Option<f64>,
    pub max_capacity: Option<f64>,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Deduplicate rows by `index`, keeping the first row of each group.
///
/// All rows with a null index fold into one group: a missing key is
/// treated as equal to every other missing key. Applying the
/// function to an already-deduped slice returns the same rows.
pub fn dedupe_by_index<'a>(rows: &'a [SectionRecord]) -> Vec<&'a SectionRecord> {
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.index.as_deref()))
        .collect()
}

/// Count distinct non-null keys; null keys never contribute.
fn distinct_count<'a>(keys: impl Iterator<Item = Option<&'a str>>) -> usize {
    keys.flatten().collect::<HashSet<&str>>().len()
}

/// Sum `value` per non-null key, preserving first-appearance key order.
fn group_sum<'a>(
    pairs: impl Iterator<Item = (Option<&'a str>, f64)>,
) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for (key, value) in pairs {
        let Some(key) = key else { continue };
        if !sums.contains_key(key) {
            order.push(key.to_string());
        }
        *sums.entry(key.to_string()).or_insert(0.0) += value;
    }
    order
        .into_iter()
        .map(|k| {
            let v = sums[&k];
            (k, v)
        })
        .collect()
}

/// Distinct non-null `value` keys per non-null group key, preserving
/// first-appearance group order.
fn group_distinct<'a>(
    pairs: impl Iterator<Item = (Option<&'a str>, Option<&'a str>)>,
) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut sets: HashMap<String, HashSet<String>> = HashMap::new();
    for (key, value) in pairs {
        let Some(key) = key else { continue };
        let Some(value) = value else { continue };
        if !sets.contains_key(key) {
            order.push(key.to_string());
        }
        sets.entry(key.to_string())
            .or_default()
            .insert(value.to_string());
    }
    order
        .into_iter()
        .map(|k| {
            let n = sets[&k].len();
            (k, n)
        })
        .collect()
}

/// Stable descending sort on the metric, then truncate to `n`.
///
/// Ties keep the first-appearance order of the group key, so the result
/// is deterministic for any input.
fn top_n<K>(mut groups: Vec<(K, f64)>, n: usize) -> Vec<(K, f64)> {
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    groups.truncate(n);
    groups
}

/// Guard that all of `required` columns are present, or fail with the
/// insufficient-data signal for `query`.
fn require_columns(table: &ScheduleTable, query: &str, required: &[&str]) -> Result<()> {
    let missing = table.missing_columns(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ScheduleError::missing_columns(query, missing))
    }
}

// ── Academics view ────────────────────────────────────────────────────────────

/// Count distinct scheduled sections per course level.
///
/// Rows are deduped by `Index` first; rows whose code yields an Unknown
/// level are excluded from every count including the total.
pub fn level_counts(table: &ScheduleTable) -> Result<LevelCounts> {
    require_columns(table, "level_counts", &["Code", "Index"])?;

    let mut counts = LevelCounts::default();
    for row in dedupe_by_index(&table.rows) {
        match row.course_level {
            CourseLevel::Foundation => counts.foundation += 1,
            CourseLevel::Undergraduate => counts.undergraduate += 1,
            CourseLevel::Graduate => counts.graduate += 1,
            CourseLevel::Unknown => continue,
        }
        counts.total += 1;
    }
    Ok(counts)
}

/// Sum enrollment per college, with each college's share of the total.
///
/// Rows without a college are excluded from grouping. Sorted by
/// enrollment descending.
pub fn enrollment_by_college(table: &ScheduleTable) -> Result<Vec<CollegeEnrollment>> {
    require_columns(table, "enrollment_by_college", &["College", "Reg. Stud."])?;

    let groups = group_sum(
        table
            .rows
            .iter()
            .map(|r| (r.college.as_deref(), r.reg_students.unwrap_or(0.0))),
    );
    let grand_total: f64 = groups.iter().map(|(_, v)| v).sum();
    let sorted = top_n(groups, usize::MAX);

    Ok(sorted
        .into_iter()
        .map(|(college, students)| CollegeEnrollment {
            college,
            students,
            percentage: if grand_total == 0.0 {
                0.0
            } else {
                round1(students / grand_total * 100.0)
            },
        })
        .collect())
}

/// Top-N general-education courses by total enrollment.
///
/// General education is the college literally named "gen"
/// (case-insensitive). Groups by (code, title).
pub fn top_general_education_courses(table: &ScheduleTable, n: usize) -> Result<Vec<CourseMetric>> {
    require_columns(
        table,
        "top_general_education_courses",
        &["College", "Reg. Stud.", "Code", "Title"],
    )?;

    let gen_rows = table
        .rows
        .iter()
        .filter(|r| matches!(&r.college, Some(c) if c.to_lowercase() == "gen"));
    top_courses_by(gen_rows, |r| r.reg_students, n)
}

/// Top-N courses by total late registrations, grouped by (code, title).
pub fn top_late_registrations(table: &ScheduleTable, n: usize) -> Result<Vec<CourseMetric>> {
    require_columns(
        table,
        "top_late_registrations",
        &["Late Registration", "Code", "Title"],
    )?;
    top_courses_by(table.rows.iter(), |r| r.late_registration, n)
}

/// Shared (code, title) grouping driver for the course rankings.
fn top_courses_by<'a>(
    rows: impl Iterator<Item = &'a SectionRecord>,
    metric: impl Fn(&SectionRecord) -> Option<f64>,
    n: usize,
) -> Result<Vec<CourseMetric>> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut sums: HashMap<(String, String), f64> = HashMap::new();
    for row in rows {
        let (Some(code), Some(title)) = (&row.code, &row.title) else {
            continue;
        };
        let key = (code.clone(), title.clone());
        if !sums.contains_key(&key) {
            order.push(key.clone());
        }
        *sums.entry(key).or_insert(0.0) += metric(row).unwrap_or(0.0);
    }

    let groups: Vec<((String, String), f64)> =
        order.into_iter().map(|k| {
            let v = sums[&k];
            (k, v)
        }).collect();

    Ok(top_n(groups, n)
        .into_iter()
        .map(|((code, title), value)| CourseMetric { code, title, value })
        .collect())
}

/// Classes and enrolled students per weekday.
///
/// Each populated `Days1..Days5` cell contributes one observation
/// carrying the row's full enrollment (enrollment is not divided across
/// days). Output follows the fixed weekday order M, T, W, Th, F; days
/// with no observations are omitted.
pub fn day_distribution(table: &ScheduleTable) -> Result<Vec<DaySummary>> {
    let day_columns = ["Days1", "Days2", "Days3", "Days4", "Days5"];
    let has_any_day = day_columns.iter().any(|c| table.has_column(c));
    if !has_any_day || !table.has_column("Reg. Stud.") {
        let mut missing = if has_any_day {
            Vec::new()
        } else {
            day_columns.iter().map(|c| c.to_string()).collect()
        };
        missing.extend(table.missing_columns(&["Reg. Stud."]));
        return Err(ScheduleError::missing_columns("day_distribution", missing));
    }

    let mut counts: HashMap<&str, (usize, f64)> = HashMap::new();
    for row in &table.rows {
        for day in row.scheduled_days() {
            let Some(canonical) = DAY_ORDER.iter().find(|d| **d == day).copied() else {
                continue;
            };
            let slot = counts.entry(canonical).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += row.reg_students.unwrap_or(0.0);
        }
    }

    Ok(DAY_ORDER
        .iter()
        .filter_map(|day| {
            counts.get(day).map(|(classes, students)| DaySummary {
                day: day.to_string(),
                classes: *classes,
                students: *students,
            })
        })
        .collect())
}

/// Number of classes starting at each hour between 08:00 and 20:00
/// inclusive, ascending by hour.
pub fn start_hour_distribution(table: &ScheduleTable) -> Result<Vec<HourCount>> {
    require_columns(table, "start_hour_distribution", &["Time"])?;

    let mut counts: HashMap<u32, usize> = HashMap::new();
    for row in &table.rows {
        if let Some(hour) = row.start_hour() {
            if (8..=20).contains(&hour) {
                *counts.entry(hour).or_insert(0) += 1;
            }
        }
    }

    let mut result: Vec<HourCount> = counts
        .into_iter()
        .map(|(hour, classes)| HourCount { hour, classes })
        .collect();
    result.sort_by_key(|h| h.hour);
    Ok(result)
}

/// Class-length distribution after back-to-back collapsing.
///
/// Considers only retained (non-suppressed) rows whose effective
/// duration is one of 50, 75 or 150 minutes; reports count and share per
/// bucket, ascending by duration.
pub fn duration_distribution(table: &ScheduleTable) -> Result<Vec<DurationBucket>> {
    require_columns(table, "duration_distribution", &["Duration", "Type"])?;

    const BUCKETS: [u32; 3] = [50, 75, 150];
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for row in &table.rows {
        if row.duration_suppressed {
            continue;
        }
        let Some(effective) = row.effective_duration else {
            continue;
        };
        let minutes = effective as u32;
        if effective == f64::from(minutes) && BUCKETS.contains(&minutes) {
            *counts.entry(minutes).or_insert(0) += 1;
        }
    }

    let total: usize = counts.values().sum();
    Ok(BUCKETS
        .iter()
        .filter_map(|minutes| {
            counts.get(minutes).map(|count| DurationBucket {
                minutes: *minutes,
                count: *count,
                percentage: round1(*count as f64 / total as f64 * 100.0),
            })
        })
        .collect())
}

/// Classify every distinct section into an occupancy band.
///
/// Bands follow the derived per-row occupancy rate: under 50%,
/// [50, 90), and 90% or more. Counts are distinct non-null `Index`
/// values per band.
pub fn occupancy_buckets(table: &ScheduleTable) -> Result<OccupancyBuckets> {
    require_columns(
        table,
        "occupancy_buckets",
        &["Reg. Stud.", "Hall capacity", "Index"],
    )?;

    let band = |rate: f64| {
        if rate < 50.0 {
            0
        } else if rate < 90.0 {
            1
        } else {
            2
        }
    };

    let mut seen: [HashSet<&str>; 3] = Default::default();
    for row in &table.rows {
        let Some(index) = row.index.as_deref() else {
            continue;
        };
        seen[band(row.occupancy_rate)].insert(index);
    }

    Ok(OccupancyBuckets {
        under_utilized: seen[0].len(),
        optimal: seen[1].len(),
        over_utilized: seen[2].len(),
    })
}

// ── Faculty view ──────────────────────────────────────────────────────────────

/// Headline faculty-workload figures.
///
/// The per-instructor averages degrade individually: each is `None` when
/// its extra source column is absent, while the instructor count only
/// needs `Instructor`.
pub fn faculty_summary(table: &ScheduleTable) -> Result<FacultySummary> {
    require_columns(table, "faculty_summary", &["Instructor"])?;

    let total_instructors = distinct_count(table.rows.iter().map(|r| r.instructor.as_deref()));

    let avg_courses_per_instructor = if table.has_column("Index") && total_instructors > 0 {
        let total_courses = distinct_count(table.rows.iter().map(|r| r.index.as_deref()));
        Some(total_courses as f64 / total_instructors as f64)
    } else {
        None
    };

    let avg_students_per_instructor = if table.has_column("Reg. Stud.") && total_instructors > 0 {
        let per_instructor = group_sum(
            table
                .rows
                .iter()
                .map(|r| (r.instructor.as_deref(), r.reg_students.unwrap_or(0.0))),
        );
        if per_instructor.is_empty() {
            None
        } else {
            let sum: f64 = per_instructor.iter().map(|(_, v)| v).sum();
            Some(sum / per_instructor.len() as f64)
        }
    } else {
        None
    };

    Ok(FacultySummary {
        total_instructors,
        avg_courses_per_instructor,
        avg_students_per_instructor,
    })
}

/// Distinct instructors per college.
pub fn instructors_by_college(table: &ScheduleTable) -> Result<Vec<KeyedCount>> {
    require_columns(table, "instructors_by_college", &["College", "Instructor"])?;

    Ok(group_distinct(
        table
            .rows
            .iter()
            .map(|r| (r.college.as_deref(), r.instructor.as_deref())),
    )
    .into_iter()
    .map(|(key, count)| KeyedCount { key, count })
    .collect())
}

/// Top-N instructors by distinct section count.
pub fn top_instructors_by_courses(table: &ScheduleTable, n: usize) -> Result<Vec<KeyedCount>> {
    require_columns(table, "top_instructors_by_courses", &["Instructor", "Index"])?;

    let groups: Vec<(String, f64)> = group_distinct(
        table
            .rows
            .iter()
            .map(|r| (r.instructor.as_deref(), r.index.as_deref())),
    )
    .into_iter()
    .map(|(k, count)| (k, count as f64))
    .collect();

    Ok(top_n(groups, n)
        .into_iter()
        .map(|(key, count)| KeyedCount {
            key,
            count: count as usize,
        })
        .collect())
}

/// Top-N instructors by total enrolled students.
pub fn top_instructors_by_students(table: &ScheduleTable, n: usize) -> Result<Vec<KeyedSum>> {
    require_columns(
        table,
        "top_instructors_by_students",
        &["Instructor", "Reg. Stud."],
    )?;

    let groups = group_sum(
        table
            .rows
            .iter()
            .map(|r| (r.instructor.as_deref(), r.reg_students.unwrap_or(0.0))),
    );

    Ok(top_n(groups, n)
        .into_iter()
        .map(|(key, total)| KeyedSum { key, total })
        .collect())
}

// ── Facilities view ───────────────────────────────────────────────────────────

/// Room-stock metrics over valid rooms.
///
/// A row counts as a valid room observation when its hall label is
/// present and contains at least one digit (placeholder labels like
/// "TBA" never qualify) and its capacity is numeric.
pub fn room_metrics(table: &ScheduleTable) -> Result<RoomMetrics> {
    require_columns(table, "room_metrics", &["Hall", "Hall capacity"])?;

    let valid: Vec<&SectionRecord> = table
        .rows
        .iter()
        .filter(|r| {
            matches!(&r.hall, Some(h) if contains_digit(h)) && r.hall_capacity.is_some()
        })
        .collect();

    let total_rooms = distinct_count(valid.iter().map(|r| r.hall.as_deref()));
    let min_capacity = valid
        .iter()
        .filter_map(|r| r.hall_capacity)
        .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |a| a.min(c))));
    let max_capacity = valid
        .iter()
        .filter_map(|r| r.hall_capacity)
        .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |a| a.max(c))));

    Ok(RoomMetrics {
        total_rooms,
        min_capacity,
        max_capacity,
    })
}

/// Distinct rooms per building.
///
/// Rooms without a building-qualified label (no "/" in the hall cell)
/// are excluded, not zero-filled.
pub fn rooms_by_building(table: &ScheduleTable) -> Result<Vec<KeyedCount>> {
    require_columns(table, "rooms_by_building", &["Hall"])?;

    Ok(group_distinct(
        table
            .rows
            .iter()
            .map(|r| (r.building.as_deref(), r.hall.as_deref())),
    )
    .into_iter()
    .map(|(key, count)| KeyedCount { key, count })
    .collect())
}

/// Top-N rooms by distinct section count.
pub fn top_rooms_by_classes(table: &ScheduleTable, n: usize) -> Result<Vec<KeyedCount>> {
    require_columns(table, "top_rooms_by_classes", &["Hall", "Index"])?;

    let groups: Vec<(String, f64)> = group_distinct(
        table
            .rows
            .iter()
            .map(|r| (r.hall.as_deref(), r.index.as_deref())),
    )
    .into_iter()
    .map(|(k, count)| (k, count as f64))
    .collect();

    Ok(top_n(groups, n)
        .into_iter()
        .map(|(key, count)| KeyedCount {
            key,
            count: count as usize,
        })
        .collect())
}

/// Distinct sections held per building.
pub fn classes_by_building(table: &ScheduleTable) -> Result<Vec<KeyedCount>> {
    require_columns(table, "classes_by_building", &["Hall", "Index"])?;

    Ok(group_distinct(
        table
            .rows
            .iter()
            .map(|r| (r.building.as_deref(), r.index.as_deref())),
    )
    .into_iter()
    .map(|(key, count)| KeyedCount { key, count })
    .collect())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use schedule_core::derive::{compute_occupancy_rate, extract_course_level};
    use std::collections::HashSet as StdHashSet;

    /// Row builder mirroring what normalization would produce.
    fn make_row(index: &str, code: &str, college: Option<&str>, reg: Option<f64>) -> SectionRecord {
        SectionRecord {
            index: Some(index.to_string()),
            code: Some(code.to_string()),
            title: Some(format!("{} title", code)),
            college: college.map(|c| c.to_string()),
            reg_students: reg,
            course_level: extract_course_level(Some(code)),
            ..Default::default()
        }
    }

    fn make_table(rows: Vec<SectionRecord>, columns: &[&str]) -> ScheduleTable {
        let columns: StdHashSet<String> = columns.iter().map(|c| c.to_string()).collect();
        ScheduleTable::new(rows, columns)
    }

    const ALL_COLUMNS: [&str; 17] = [
        "Index",
        "Code",
        "Title",
        "College",
        "Instructor",
        "Days1",
        "Days2",
        "Days3",
        "Days4",
        "Days5",
        "Time",
        "Hall",
        "Hall capacity",
        "Reg. Stud.",
        "Duration",
        "Type",
        "Late Registration",
    ];

    // ── dedupe_by_index ───────────────────────────────────────────────────────

    #[test]
    fn test_dedupe_keeps_first_per_index() {
        let rows = vec![
            make_row("1", "ACC101", None, Some(10.0)),
            make_row("1", "ACC101", None, Some(10.0)),
            make_row("2", "ACC101", None, Some(12.0)),
        ];
        let deduped = dedupe_by_index(&rows);
        assert_eq!(deduped.len(), 2);
        assert!(std::ptr::eq(deduped[0], &rows[0]));
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let rows = vec![
            make_row("1", "ACC101", None, None),
            make_row("1", "ACC101", None, None),
            make_row("2", "PSY502", None, None),
        ];
        let once: Vec<SectionRecord> = dedupe_by_index(&rows).into_iter().cloned().collect();
        let twice: Vec<SectionRecord> = dedupe_by_index(&once).into_iter().cloned().collect();
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.index, b.index);
        }
    }

    #[test]
    fn test_dedupe_null_indexes_fold_into_one() {
        let mut a = make_row("1", "ACC101", None, None);
        a.index = None;
        let mut b = make_row("2", "PSY502", None, None);
        b.index = None;
        let rows = vec![a, b];
        assert_eq!(dedupe_by_index(&rows).len(), 1);
    }

    // ── level_counts ──────────────────────────────────────────────────────────

    #[test]
    fn test_level_counts_end_to_end_scenario() {
        // Two rows share an Index (same section split across days); one
        // graduate course in a different college.
        let rows = vec![
            make_row("10", "ACC101", Some("BCB"), Some(20.0)),
            make_row("10", "ACC101", Some("BCB"), Some(20.0)),
            make_row("11", "PSY502", Some("CHSE"), Some(15.0)),
        ];
        let table = make_table(rows, &ALL_COLUMNS);
        let counts = level_counts(&table).expect("counts");

        assert_eq!(counts.undergraduate, 1);
        assert_eq!(counts.graduate, 1);
        assert_eq!(counts.foundation, 0);
        assert_eq!(counts.total, 2);
    }

    #[test]
    fn test_level_counts_excludes_unknown() {
        let rows = vec![
            make_row("1", "ABC", None, None), // no digit → Unknown
            make_row("2", "ECO201", None, None),
        ];
        let table = make_table(rows, &ALL_COLUMNS);
        let counts = level_counts(&table).expect("counts");
        assert_eq!(counts.total, 1);
        assert_eq!(counts.undergraduate, 1);
    }

    #[test]
    fn test_level_counts_missing_column_is_insufficient_data() {
        let table = make_table(vec![], &["Code"]);
        let err = level_counts(&table).unwrap_err();
        assert!(err.is_insufficient_data());
        assert!(err.to_string().contains("Index"));
    }

    #[test]
    fn test_level_counts_empty_table() {
        let table = make_table(vec![], &ALL_COLUMNS);
        assert_eq!(level_counts(&table).expect("counts"), LevelCounts::default());
    }

    // ── enrollment_by_college ─────────────────────────────────────────────────

    #[test]
    fn test_enrollment_by_college_sums_and_shares() {
        let rows = vec![
            make_row("1", "ACC101", Some("BCB"), Some(30.0)),
            make_row("2", "FIN301", Some("BCB"), Some(20.0)),
            make_row("3", "PSY502", Some("CHSE"), Some(50.0)),
            make_row("4", "LAW101", None, Some(99.0)), // null college excluded
        ];
        let table = make_table(rows, &ALL_COLUMNS);
        let result = enrollment_by_college(&table).expect("result");

        assert_eq!(result.len(), 2);
        // Sorted descending by enrollment.
        assert_eq!(result[0].college, "BCB");
        assert_eq!(result[0].students, 50.0);
        assert_eq!(result[0].percentage, 50.0);
        assert_eq!(result[1].college, "CHSE");
        assert_eq!(result[1].percentage, 50.0);
    }

    #[test]
    fn test_enrollment_by_college_empty_table() {
        let table = make_table(vec![], &ALL_COLUMNS);
        assert!(enrollment_by_college(&table).expect("result").is_empty());
    }

    // ── top_general_education_courses ─────────────────────────────────────────

    #[test]
    fn test_top_gen_ed_filters_college_case_insensitively() {
        let rows = vec![
            make_row("1", "GEN101", Some("GEN"), Some(40.0)),
            make_row("2", "GEN102", Some("gen"), Some(60.0)),
            make_row("3", "ACC101", Some("BCB"), Some(500.0)),
        ];
        let table = make_table(rows, &ALL_COLUMNS);
        let result = top_general_education_courses(&table, 10).expect("result");

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].code, "GEN102");
        assert_eq!(result[0].value, 60.0);
    }

    // ── top_n behaviour ───────────────────────────────────────────────────────

    #[test]
    fn test_top_n_truncates_and_sorts_descending() {
        // 12 groups with distinct sums → top 10 exactly, descending.
        let rows: Vec<SectionRecord> = (0..12)
            .map(|i| {
                let mut r = make_row(
                    &format!("{}", i),
                    &format!("GEN1{:02}", i),
                    Some("GEN"),
                    Some(10.0 + i as f64),
                );
                r.title = Some(format!("Course {}", i));
                r
            })
            .collect();
        let table = make_table(rows, &ALL_COLUMNS);
        let result = top_general_education_courses(&table, 10).expect("result");

        assert_eq!(result.len(), 10);
        for pair in result.windows(2) {
            assert!(pair[0].value > pair[1].value);
        }
        assert_eq!(result[0].value, 21.0);
    }

    #[test]
    fn test_top_n_ties_keep_first_appearance_order() {
        let rows = vec![
            make_row("1", "GEN110", Some("GEN"), Some(25.0)),
            make_row("2", "GEN120", Some("GEN"), Some(25.0)),
        ];
        let table = make_table(rows, &ALL_COLUMNS);
        let result = top_general_education_courses(&table, 2).expect("result");
        assert_eq!(result[0].code, "GEN110");
        assert_eq!(result[1].code, "GEN120");
    }

    // ── top_late_registrations ────────────────────────────────────────────────

    #[test]
    fn test_top_late_registrations_sums_per_course() {
        let mut a = make_row("1", "ACC101", Some("BCB"), None);
        a.late_registration = Some(3.0);
        let mut b = make_row("2", "ACC101", Some("BCB"), None);
        b.late_registration = Some(4.0);
        let mut c = make_row("3", "FIN301", Some("BCB"), None);
        c.late_registration = Some(5.0);
        let table = make_table(vec![a, b, c], &ALL_COLUMNS);

        let result = top_late_registrations(&table, 10).expect("result");
        assert_eq!(result[0].code, "ACC101");
        assert_eq!(result[0].value, 7.0);
        assert_eq!(result[1].value, 5.0);
    }

    // ── day_distribution ──────────────────────────────────────────────────────

    #[test]
    fn test_day_distribution_counts_every_observation() {
        let mut a = make_row("1", "ACC101", None, Some(20.0));
        a.days = [
            Some("M".to_string()),
            Some("W".to_string()),
            Some("F".to_string()),
            None,
            None,
        ];
        let mut b = make_row("2", "PSY502", None, Some(15.0));
        b.days = [Some("M".to_string()), None, None, None, None];
        let table = make_table(vec![a, b], &ALL_COLUMNS);

        let result = day_distribution(&table).expect("result");
        let total_observations: usize = result.iter().map(|d| d.classes).sum();
        assert_eq!(total_observations, 4);

        // Fixed weekday order; enrollment carried in full per day.
        assert_eq!(result[0].day, "M");
        assert_eq!(result[0].classes, 2);
        assert_eq!(result[0].students, 35.0);
        assert_eq!(result[1].day, "W");
        assert_eq!(result[2].day, "F");
    }

    #[test]
    fn test_day_distribution_null_enrollment_counts_as_zero() {
        let mut a = make_row("1", "ACC101", None, None);
        a.days = [Some("T".to_string()), None, None, None, None];
        let table = make_table(vec![a], &ALL_COLUMNS);

        let result = day_distribution(&table).expect("result");
        assert_eq!(result[0].classes, 1);
        assert_eq!(result[0].students, 0.0);
    }

    // ── start_hour_distribution ───────────────────────────────────────────────

    #[test]
    fn test_start_hours_filtered_to_working_range() {
        let mut rows = Vec::new();
        for (i, time) in ["08:00 - 08:50", "14:30 - 15:45", "21:00 - 22:00", "07:00 - 07:50"]
            .iter()
            .enumerate()
        {
            let mut r = make_row(&format!("{}", i), "ACC101", None, None);
            r.time = Some(time.to_string());
            rows.push(r);
        }
        let table = make_table(rows, &ALL_COLUMNS);

        let result = start_hour_distribution(&table).expect("result");
        let hours: Vec<u32> = result.iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![8, 14]);
    }

    // ── duration_distribution ─────────────────────────────────────────────────

    #[test]
    fn test_duration_distribution_uses_retained_rows() {
        let mut a = make_row("1", "FIN301", None, None);
        a.section_type = Some("Back-to-Back".to_string());
        a.duration = Some(75.0);
        let mut b = make_row("2", "FIN301", None, None);
        b.section_type = Some("Back-to-Back".to_string());
        b.duration = Some(75.0);
        let mut c = make_row("3", "ACC101", None, None);
        c.duration = Some(50.0);
        let mut rows = vec![a, b, c];
        crate::normalize::collapse_duration_samples(&mut rows);
        let table = make_table(rows, &ALL_COLUMNS);

        let result = duration_distribution(&table).expect("result");
        // One retained 150-minute pair plus one 50-minute class.
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].minutes, 50);
        assert_eq!(result[0].count, 1);
        assert_eq!(result[0].percentage, 50.0);
        assert_eq!(result[1].minutes, 150);
        assert_eq!(result[1].count, 1);
    }

    #[test]
    fn test_duration_distribution_ignores_other_lengths() {
        let mut a = make_row("1", "ACC101", None, None);
        a.duration = Some(90.0);
        a.effective_duration = Some(90.0);
        let table = make_table(vec![a], &ALL_COLUMNS);
        assert!(duration_distribution(&table).expect("result").is_empty());
    }

    // ── occupancy_buckets ─────────────────────────────────────────────────────

    #[test]
    fn test_occupancy_buckets_classify_distinct_sections() {
        let mut rows = Vec::new();
        for (i, (reg, cap)) in [(10.0, 50.0), (30.0, 50.0), (49.0, 50.0)].iter().enumerate() {
            let mut r = make_row(&format!("{}", i), "ACC101", None, Some(*reg));
            r.hall_capacity = Some(*cap);
            r.occupancy_rate = compute_occupancy_rate(Some(*reg), Some(*cap));
            rows.push(r);
        }
        let table = make_table(rows, &ALL_COLUMNS);

        let buckets = occupancy_buckets(&table).expect("buckets");
        assert_eq!(buckets.under_utilized, 1); // 20%
        assert_eq!(buckets.optimal, 1); // 60%
        assert_eq!(buckets.over_utilized, 1); // 98%
    }

    #[test]
    fn test_occupancy_buckets_boundary_values() {
        let mut rows = Vec::new();
        for (i, rate) in [49.9, 50.0, 89.9, 90.0].iter().enumerate() {
            let mut r = make_row(&format!("{}", i), "ACC101", None, None);
            r.occupancy_rate = *rate;
            rows.push(r);
        }
        let table = make_table(rows, &ALL_COLUMNS);

        let buckets = occupancy_buckets(&table).expect("buckets");
        assert_eq!(buckets.under_utilized, 1);
        assert_eq!(buckets.optimal, 2);
        assert_eq!(buckets.over_utilized, 1);
    }

    // ── faculty queries ───────────────────────────────────────────────────────

    fn staffed(index: &str, instructor: &str, college: &str, reg: f64) -> SectionRecord {
        let mut r = make_row(index, "ACC101", Some(college), Some(reg));
        r.instructor = Some(instructor.to_string());
        r
    }

    #[test]
    fn test_faculty_summary_averages() {
        let rows = vec![
            staffed("1", "Smith", "BCB", 30.0),
            staffed("2", "Smith", "BCB", 20.0),
            staffed("3", "Lee", "LAW", 10.0),
            make_row("4", "XYZ101", None, Some(99.0)), // unstaffed, not counted
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let summary = faculty_summary(&table).expect("summary");
        assert_eq!(summary.total_instructors, 2);
        // 4 distinct sections / 2 instructors.
        assert_eq!(summary.avg_courses_per_instructor, Some(2.0));
        // Smith 50 + Lee 10 → mean 30.
        assert_eq!(summary.avg_students_per_instructor, Some(30.0));
    }

    #[test]
    fn test_faculty_summary_no_instructors() {
        let table = make_table(vec![make_row("1", "ACC101", None, None)], &ALL_COLUMNS);
        let summary = faculty_summary(&table).expect("summary");
        assert_eq!(summary.total_instructors, 0);
        assert_eq!(summary.avg_courses_per_instructor, None);
        assert_eq!(summary.avg_students_per_instructor, None);
    }

    #[test]
    fn test_instructors_by_college_distinct_counts() {
        let rows = vec![
            staffed("1", "Smith", "BCB", 0.0),
            staffed("2", "Smith", "BCB", 0.0),
            staffed("3", "Lee", "BCB", 0.0),
            staffed("4", "Kim", "LAW", 0.0),
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let result = instructors_by_college(&table).expect("result");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].key, "BCB");
        assert_eq!(result[0].count, 2);
        assert_eq!(result[1].key, "LAW");
        assert_eq!(result[1].count, 1);
    }

    #[test]
    fn test_top_instructors_by_courses() {
        let rows = vec![
            staffed("1", "Smith", "BCB", 0.0),
            staffed("2", "Smith", "BCB", 0.0),
            staffed("2", "Smith", "BCB", 0.0), // same section, second day
            staffed("3", "Lee", "LAW", 0.0),
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let result = top_instructors_by_courses(&table, 15).expect("result");
        assert_eq!(result[0].key, "Smith");
        assert_eq!(result[0].count, 2);
        assert_eq!(result[1].count, 1);
    }

    #[test]
    fn test_top_instructors_by_students() {
        let rows = vec![
            staffed("1", "Smith", "BCB", 30.0),
            staffed("2", "Lee", "LAW", 45.0),
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let result = top_instructors_by_students(&table, 15).expect("result");
        assert_eq!(result[0].key, "Lee");
        assert_eq!(result[0].total, 45.0);
    }

    // ── facilities queries ────────────────────────────────────────────────────

    fn housed(index: &str, hall: &str, capacity: Option<f64>) -> SectionRecord {
        let mut r = make_row(index, "ACC101", None, None);
        r.hall = Some(hall.to_string());
        r.hall_capacity = capacity;
        r.building = schedule_core::derive::extract_building(Some(hall));
        r
    }

    #[test]
    fn test_room_metrics_requires_digit_bearing_hall() {
        let rows = vec![
            housed("1", "105 / Main", Some(40.0)),
            housed("2", "207 / Main", Some(80.0)),
            housed("3", "TBA", Some(500.0)),      // no digit → excluded
            housed("4", "301 / East", None),      // no capacity → excluded
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let metrics = room_metrics(&table).expect("metrics");
        assert_eq!(metrics.total_rooms, 2);
        assert_eq!(metrics.min_capacity, Some(40.0));
        assert_eq!(metrics.max_capacity, Some(80.0));
    }

    #[test]
    fn test_room_metrics_empty_when_no_valid_rooms() {
        let table = make_table(vec![housed("1", "TBA", Some(10.0))], &ALL_COLUMNS);
        let metrics = room_metrics(&table).expect("metrics");
        assert_eq!(metrics.total_rooms, 0);
        assert_eq!(metrics.min_capacity, None);
    }

    #[test]
    fn test_rooms_by_building_counts_distinct_halls() {
        let rows = vec![
            housed("1", "105 / Main", None),
            housed("2", "105 / Main", None), // same room again
            housed("3", "207 / Main", None),
            housed("4", "12 / East", None),
            housed("5", "Gym", None), // no building → excluded
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let result = rooms_by_building(&table).expect("result");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].key, "Main");
        assert_eq!(result[0].count, 2);
        assert_eq!(result[1].key, "East");
        assert_eq!(result[1].count, 1);
    }

    #[test]
    fn test_top_rooms_by_classes() {
        let rows = vec![
            housed("1", "105 / Main", None),
            housed("2", "105 / Main", None),
            housed("2", "105 / Main", None), // duplicate section
            housed("3", "207 / Main", None),
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let result = top_rooms_by_classes(&table, 10).expect("result");
        assert_eq!(result[0].key, "105 / Main");
        assert_eq!(result[0].count, 2);
    }

    #[test]
    fn test_classes_by_building() {
        let rows = vec![
            housed("1", "105 / Main", None),
            housed("2", "207 / Main", None),
            housed("3", "12 / East", None),
        ];
        let table = make_table(rows, &ALL_COLUMNS);

        let result = classes_by_building(&table).expect("result");
        assert_eq!(result[0].key, "Main");
        assert_eq!(result[0].count, 2);
        assert_eq!(result[1].key, "East");
        assert_eq!(result[1].count, 1);
    }
}
