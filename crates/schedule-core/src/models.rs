use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Academic level of a course, classified from the first decimal digit of
/// its course code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    /// First digit 0 (preparatory / foundation programme).
    Foundation,
    /// First digit 1–4.
    Undergraduate,
    /// First digit 5–9.
    Graduate,
    /// No digit present, or the code cell is empty.
    Unknown,
}

impl CourseLevel {
    /// Classify a single leading digit.
    pub fn from_digit(digit: u32) -> Self {
        match digit {
            0 => CourseLevel::Foundation,
            1..=4 => CourseLevel::Undergraduate,
            _ => CourseLevel::Graduate,
        }
    }
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CourseLevel::Foundation => "Foundation",
            CourseLevel::Undergraduate => "Undergraduate",
            CourseLevel::Graduate => "Graduate",
            CourseLevel::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// Fixed weekday ordering used by every day-of-week aggregate.
pub const DAY_ORDER: [&str; 5] = ["M", "T", "W", "Th", "F"];

/// `Time` value that marks a section without a real meeting slot.
pub const PLACEHOLDER_TIME: &str = "00:00 - 00:00";

/// One normalized section-meeting-slot row.
///
/// A logical section (one `index` value) may span several physical rows,
/// one per meeting-day split in the source sheet. Text cells that held a
/// not-a-value sentinel are `None`; numeric cells that failed coercion are
/// `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Groups the rows of one scheduled section. Not globally unique per
    /// course, only per section instance.
    pub index: Option<String>,
    /// Course code, e.g. `"ACC101"`. Its first digit encodes the level.
    pub code: Option<String>,
    /// Human-readable course name.
    pub title: Option<String>,
    /// Academic unit, e.g. `"BCB"`.
    pub college: Option<String>,
    /// Teaching instructor; `None` for an unstaffed section.
    pub instructor: Option<String>,
    /// Day tokens from `Days1`..`Days5`, each at most one of
    /// M / T / W / Th / F.
    pub days: [Option<String>; 5],
    /// Meeting time formatted `"HH:MM - HH:MM"`.
    pub time: Option<String>,
    /// Room label; may embed a building name after a `/`.
    pub hall: Option<String>,
    /// Seat count of the room.
    pub hall_capacity: Option<f64>,
    /// Enrolled student count.
    pub reg_students: Option<f64>,
    /// Section enrollment cap.
    pub limit: Option<f64>,
    /// Minutes per meeting, typically 50 or 75.
    pub duration: Option<f64>,
    /// Total minutes per week as given by the source sheet.
    pub total_duration: Option<f64>,
    /// Free-text section type; the substring "back" flags a back-to-back
    /// paired section.
    pub section_type: Option<String>,
    /// Number of late registrants.
    pub late_registration: Option<f64>,
    /// KIMEP credit weight.
    pub kimep_credit: Option<f64>,
    /// ECTS credit weight.
    pub ects_credit: Option<f64>,

    // Derived fields, computed during normalization.
    /// Level classified from the first digit of `code`.
    pub course_level: CourseLevel,
    /// 150 for a retained back-to-back row, otherwise `duration`.
    pub effective_duration: Option<f64>,
    /// True when this row was suppressed from duration-sample aggregates
    /// by back-to-back collapsing.
    pub duration_suppressed: bool,
    /// Building name split out of `hall`, when present.
    pub building: Option<String>,
    /// Enrollment as a percentage of room capacity, one decimal place.
    /// Always defined; 0.0 when capacity is missing or zero.
    pub occupancy_rate: f64,
}

impl Default for CourseLevel {
    fn default() -> Self {
        CourseLevel::Unknown
    }
}

impl SectionRecord {
    /// Whether the `Type` cell flags this row as part of a back-to-back
    /// pair (contains "back", case-insensitive; `None` never matches).
    pub fn is_back_to_back(&self) -> bool {
        self.section_type
            .as_deref()
            .map(|t| t.to_lowercase().contains("back"))
            .unwrap_or(false)
    }

    /// Parse the starting hour out of `time` (`"08:30 - 09:45"` → `8`).
    ///
    /// Returns `None` when the cell is empty or the hour does not parse.
    pub fn start_hour(&self) -> Option<u32> {
        let time = self.time.as_deref()?;
        let start = time.split('-').next()?.trim();
        start.split(':').next()?.trim().parse().ok()
    }

    /// Iterator over the populated day tokens of this row.
    pub fn scheduled_days(&self) -> impl Iterator<Item = &str> {
        self.days.iter().filter_map(|d| d.as_deref())
    }
}

/// An immutable snapshot of the normalized schedule.
///
/// Queries never mutate a snapshot; row filters build new ones. `columns`
/// records which source columns were present in the uploaded sheet so that
/// queries can distinguish "no matching rows" from "insufficient data".
#[derive(Debug, Clone, Default)]
pub struct ScheduleTable {
    /// Normalized rows in original sheet order.
    pub rows: Vec<SectionRecord>,
    /// Exact-match names of the source columns that were present.
    pub columns: HashSet<String>,
}

impl ScheduleTable {
    /// Build a snapshot from rows and the set of present source columns.
    pub fn new(rows: Vec<SectionRecord>, columns: HashSet<String>) -> Self {
        Self { rows, columns }
    }

    /// Whether the named source column was present in the input sheet.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// True when every one of `names` was present.
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_column(n))
    }

    /// Source columns from `names` that are absent, in the given order.
    pub fn missing_columns(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .filter(|n| !self.has_column(n))
            .map(|n| n.to_string())
            .collect()
    }

    /// Number of rows in the snapshot.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the snapshot holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Derive a new snapshot keeping only rows for which `pred` holds.
    /// The present-column set is carried over unchanged.
    pub fn retain_rows(&self, pred: impl Fn(&SectionRecord) -> bool) -> ScheduleTable {
        ScheduleTable {
            rows: self.rows.iter().filter(|r| pred(r)).cloned().collect(),
            columns: self.columns.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
