//! Spreadsheet loading for the schedule dashboard.
//!
//! Opens the uploaded workbook with calamine, takes the first sheet, and
//! turns it into a [`RawTable`] of header-keyed cells ready for the
//! per-column coercion pass in [`crate::normalize`].

use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use schedule_core::{Result, ScheduleError};
use tracing::debug;

// ── RawTable ──────────────────────────────────────────────────────────────────

/// The uploaded sheet as read: a header row plus untyped cell rows.
///
/// Column names are kept exactly as they appear in the sheet (trimmed,
/// case-sensitive); lookups are by exact match.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Header names in sheet order.
    pub columns: Vec<String>,
    /// Data rows; every row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<Data>>,
}

impl RawTable {
    /// Build a table from a header and rows, padding or truncating each
    /// row to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.truncate(width);
                row.resize(width, Data::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Position of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (`row`, `name`); `None` when the column is absent.
    pub fn cell(&self, row: usize, name: &str) -> Option<&Data> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// The set of present column names.
    pub fn column_set(&self) -> HashSet<String> {
        self.columns.iter().cloned().collect()
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Read the first sheet of the workbook at `path` into a [`RawTable`].
///
/// Row 0 is the header; every following row becomes a data row. Fails with
/// [`ScheduleError::FileRead`] when the file is absent or unreadable,
/// [`ScheduleError::Workbook`] when it is not a parseable spreadsheet, and
/// [`ScheduleError::EmptySheet`] when there is no sheet or no header.
pub fn load_raw_table(path: &Path) -> Result<RawTable> {
    std::fs::metadata(path).map_err(|source| ScheduleError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ScheduleError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let first_sheet = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ScheduleError::EmptySheet(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| ScheduleError::Workbook(e.to_string()))?;

    let mut rows_iter = range.rows();
    let header = rows_iter
        .next()
        .ok_or_else(|| ScheduleError::EmptySheet(path.to_path_buf()))?;

    let columns: Vec<String> = header.iter().map(header_cell_to_string).collect();
    let rows: Vec<Vec<Data>> = rows_iter.map(|r| r.to_vec()).collect();

    debug!(
        "Read sheet '{}' from {}: {} columns, {} rows",
        first_sheet,
        path.display(),
        columns.len(),
        rows.len()
    );

    Ok(RawTable::new(columns, rows))
}

/// Render a header cell as a trimmed column name.
///
/// Integral floats print without a fractional part so a numeric header
/// like `2024.0` becomes `"2024"`.
fn header_cell_to_string(cell: &Data) -> String {
    match cell {
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
        Data::Empty | Data::Error(_) => String::new(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
