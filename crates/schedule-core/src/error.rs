use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the schedule analytics core.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The input spreadsheet could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook could not be parsed as a spreadsheet.
    #[error("Failed to open workbook: {0}")]
    Workbook(String),

    /// The workbook contains no sheet, or the sheet has no header row.
    #[error("No usable sheet found in {0}")]
    EmptySheet(PathBuf),

    /// A query's required source column(s) are entirely absent.
    ///
    /// Surfaced to callers as "insufficient data for this view"; never
    /// fatal to the session, and only the query that needed the column
    /// is affected.
    #[error("Query '{query}' requires missing column(s): {}", .columns.join(", "))]
    MissingColumns { query: String, columns: Vec<String> },

    /// The user's row-filter predicate set selected zero colleges.
    #[error("No colleges selected; the filtered table is empty")]
    EmptySelection,

    /// The normalized table could not be written as delimited text.
    #[error("Export failed: {0}")]
    Export(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScheduleError {
    /// Build a [`ScheduleError::MissingColumns`] for `query`.
    pub fn missing_columns(query: &str, columns: Vec<String>) -> Self {
        ScheduleError::MissingColumns {
            query: query.to_string(),
            columns,
        }
    }

    /// Whether this error is the non-fatal "insufficient data" signal.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ScheduleError::MissingColumns { .. })
    }
}

/// Convenience alias used throughout the schedule crates.
pub type Result<T> = std::result::Result<T, ScheduleError>;
