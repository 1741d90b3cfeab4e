//! Pure rules for the derived fields of a normalized row.
//!
//! Every function here is total and deterministic: no I/O, no shared state,
//! and a defined result for every input including nulls.

use regex::Regex;

use crate::models::CourseLevel;

/// Classify a course code by its first decimal digit.
///
/// Scans left-to-right for the first character in `0-9`:
/// * `0` → [`CourseLevel::Foundation`]
/// * `1`–`4` → [`CourseLevel::Undergraduate`]
/// * `5`–`9` → [`CourseLevel::Graduate`]
///
/// A missing cell or a code without any digit classifies as
/// [`CourseLevel::Unknown`].
///
/// # Examples
///
/// ```
/// use schedule_core::derive::extract_course_level;
/// use schedule_core::models::CourseLevel;
///
/// assert_eq!(extract_course_level(Some("ECO201")), CourseLevel::Undergraduate);
/// assert_eq!(extract_course_level(Some("MBA601")), CourseLevel::Graduate);
/// assert_eq!(extract_course_level(Some("FND005")), CourseLevel::Foundation);
/// assert_eq!(extract_course_level(Some("ABC")), CourseLevel::Unknown);
/// assert_eq!(extract_course_level(None), CourseLevel::Unknown);
/// ```
pub fn extract_course_level(code: Option<&str>) -> CourseLevel {
    let Some(code) = code else {
        return CourseLevel::Unknown;
    };
    match first_digit(code) {
        Some(digit) => CourseLevel::from_digit(digit),
        None => CourseLevel::Unknown,
    }
}

/// First decimal digit found in `text`, if any.
pub fn first_digit(text: &str) -> Option<u32> {
    let re = Regex::new(r"\d").expect("regex is valid");
    re.find(text)
        .and_then(|m| m.as_str().chars().next())
        .and_then(|c| c.to_digit(10))
}

/// Whether `text` contains at least one decimal digit.
///
/// Used as the room-label validity check: halls like `"TBA"` carry no
/// digit and are excluded from room metrics.
pub fn contains_digit(text: &str) -> bool {
    first_digit(text).is_some()
}

/// Extract the building name embedded in a room label.
///
/// Splits `hall` on the first `/`; when a second segment exists its
/// surrounding whitespace is trimmed and it becomes the building name.
/// Rooms without a `/` have no building and are excluded from
/// building-level aggregates, never zero-filled.
///
/// # Examples
///
/// ```
/// use schedule_core::derive::extract_building;
///
/// assert_eq!(extract_building(Some("101 / Main")), Some("Main".to_string()));
/// assert_eq!(extract_building(Some("205/Valikhanov")), Some("Valikhanov".to_string()));
/// assert_eq!(extract_building(Some("Gym")), None);
/// assert_eq!(extract_building(None), None);
/// ```
pub fn extract_building(hall: Option<&str>) -> Option<String> {
    let hall = hall?;
    let (_, building) = hall.split_once('/')?;
    let building = building.trim();
    if building.is_empty() {
        None
    } else {
        Some(building.to_string())
    }
}

/// Enrollment as a percentage of room capacity, one decimal place.
///
/// A missing or zero capacity yields `0.0` so that no undefined value ever
/// reaches a downstream aggregate; a missing enrollment counts as 0.
/// The result is never negative for non-negative inputs and is not capped
/// above 100.
///
/// # Examples
///
/// ```
/// use schedule_core::derive::compute_occupancy_rate;
///
/// assert_eq!(compute_occupancy_rate(Some(25.0), Some(50.0)), 50.0);
/// assert_eq!(compute_occupancy_rate(Some(30.0), Some(0.0)), 0.0);
/// assert_eq!(compute_occupancy_rate(None, Some(40.0)), 0.0);
/// assert_eq!(compute_occupancy_rate(Some(120.0), Some(80.0)), 150.0);
/// ```
pub fn compute_occupancy_rate(reg_students: Option<f64>, capacity: Option<f64>) -> f64 {
    let capacity = match capacity {
        Some(c) if c != 0.0 => c,
        _ => return 0.0,
    };
    let students = reg_students.unwrap_or(0.0);
    round1(students / capacity * 100.0)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
