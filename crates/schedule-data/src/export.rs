//! CSV export of the normalized schedule table.
//!
//! Writes every row of the snapshot, including the derived columns, so a
//! downstream spreadsheet sees exactly the data the queries saw. Null
//! cells export as empty strings.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use schedule_core::models::{CourseLevel, ScheduleTable, SectionRecord};
use schedule_core::{Result, ScheduleError};
use tracing::info;

/// Column order of the exported file: the source columns first, then the
/// derived ones.
const EXPORT_HEADER: [&str; 26] = [
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
    "Limit",
    "Duration",
    "TotalDuration",
    "Type",
    "Late Registration",
    "KIMEP Credit",
    "ECTS Credit",
    "CourseLevel",
    "EffectiveDuration",
    "DurationSuppressed",
    "Building",
    "OccupancyRate",
];

/// Write the snapshot as CSV to `path`.
pub fn export_csv(table: &ScheduleTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    export_csv_to(table, file)?;
    info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write the snapshot as CSV to any writer.
pub fn export_csv_to<W: Write>(table: &ScheduleTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);

    csv_writer
        .write_record(EXPORT_HEADER)
        .map_err(|e| ScheduleError::Export(e.to_string()))?;

    for row in &table.rows {
        csv_writer
            .write_record(record_fields(row))
            .map_err(|e| ScheduleError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| ScheduleError::Export(e.to_string()))?;
    Ok(())
}

/// One CSV record in [`EXPORT_HEADER`] order.
fn record_fields(row: &SectionRecord) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let number = |v: Option<f64>| v.map(format_cell_number).unwrap_or_default();

    let mut fields = vec![
        text(&row.index),
        text(&row.code),
        text(&row.title),
        text(&row.college),
        text(&row.instructor),
    ];
    fields.extend(row.days.iter().map(text));
    fields.extend([
        text(&row.time),
        text(&row.hall),
        number(row.hall_capacity),
        number(row.reg_students),
        number(row.limit),
        number(row.duration),
        number(row.total_duration),
        text(&row.section_type),
        number(row.late_registration),
        number(row.kimep_credit),
        number(row.ects_credit),
        match row.course_level {
            CourseLevel::Unknown => String::new(),
            level => level.to_string(),
        },
        number(row.effective_duration),
        row.duration_suppressed.to_string(),
        text(&row.building),
        format!("{:.1}", row.occupancy_rate),
    ]);
    fields
}

/// Integral values print without a fractional part, so a count of `20.0`
/// exports as `"20"`.
fn format_cell_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn make_table() -> ScheduleTable {
        let row = SectionRecord {
            index: Some("1001".to_string()),
            code: Some("ACC101".to_string()),
            title: Some("Intro, Accounting".to_string()),
            college: Some("BCB".to_string()),
            days: [Some("M".to_string()), Some("W".to_string()), None, None, None],
            time: Some("08:00 - 08:50".to_string()),
            hall: Some("105 / Main".to_string()),
            hall_capacity: Some(40.0),
            reg_students: Some(20.0),
            duration: Some(50.0),
            course_level: CourseLevel::Undergraduate,
            effective_duration: Some(50.0),
            building: Some("Main".to_string()),
            occupancy_rate: 50.0,
            ..Default::default()
        };
        let columns: HashSet<String> = ["Code".to_string()].into_iter().collect();
        ScheduleTable::new(vec![row], columns)
    }

    fn export_to_string(table: &ScheduleTable) -> String {
        let mut buf = Vec::new();
        export_csv_to(table, &mut buf).expect("export");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn test_export_header_row() {
        let output = export_to_string(&make_table());
        let header = output.lines().next().expect("header");
        assert!(header.starts_with("Index,Code,Title"));
        assert!(header.contains("Reg. Stud."));
        assert!(header
            .ends_with("CourseLevel,EffectiveDuration,DurationSuppressed,Building,OccupancyRate"));
    }

    #[test]
    fn test_export_row_values() {
        let output = export_to_string(&make_table());
        let row = output.lines().nth(1).expect("data row");
        assert!(row.starts_with("1001,ACC101"));
        // Comma-bearing titles get quoted.
        assert!(row.contains("\"Intro, Accounting\""));
        // Integral numbers print without a fractional part.
        assert!(row.contains(",40,20,"));
        assert!(row.contains("Undergraduate"));
    }

    #[test]
    fn test_export_null_cells_are_empty() {
        let columns: HashSet<String> = HashSet::new();
        let table = ScheduleTable::new(vec![SectionRecord::default()], columns);
        let output = export_to_string(&table);
        let row = output.lines().nth(1).expect("data row");
        // Every nullable field exports empty; only the always-defined
        // derived cells carry a value.
        assert!(row.starts_with(","));
        assert!(row.ends_with(",false,,0.0"));
    }

    #[test]
    fn test_export_csv_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("schedule.csv");
        export_csv(&make_table(), &path).expect("export");

        let contents = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_format_cell_number() {
        assert_eq!(format_cell_number(20.0), "20");
        assert_eq!(format_cell_number(2.5), "2.5");
    }
}
