//! End-to-end ingestion: workbook file in, queryable snapshot out.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use schedule_core::models::ScheduleTable;
use schedule_core::Result;
use serde::Serialize;
use tracing::info;

use crate::normalize::normalize_table;
use crate::reader::load_raw_table;

/// Provenance of one ingestion pass.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineMetadata {
    /// When the snapshot was produced.
    pub generated_at: DateTime<Utc>,
    /// Data rows read from the sheet, before normalization.
    pub rows_read: usize,
    /// Rows in the normalized snapshot.
    pub rows_normalized: usize,
    /// Numeric cells that failed coercion and became null.
    pub coercion_failures: usize,
    pub load_time_seconds: f64,
    pub normalize_time_seconds: f64,
}

/// A normalized snapshot together with its ingestion metadata.
#[derive(Debug, Clone)]
pub struct ScheduleSnapshot {
    pub table: ScheduleTable,
    pub metadata: PipelineMetadata,
}

/// Load and normalize the workbook at `path` in one pass.
pub fn load_schedule(path: &Path) -> Result<ScheduleSnapshot> {
    let load_start = Instant::now();
    let raw = load_raw_table(path)?;
    let load_time_seconds = load_start.elapsed().as_secs_f64();
    let rows_read = raw.rows.len();

    let normalize_start = Instant::now();
    let (table, stats) = normalize_table(&raw);
    let normalize_time_seconds = normalize_start.elapsed().as_secs_f64();

    let metadata = PipelineMetadata {
        generated_at: Utc::now(),
        rows_read,
        rows_normalized: table.len(),
        coercion_failures: stats.numeric_failures,
        load_time_seconds,
        normalize_time_seconds,
    };

    info!(
        "Loaded {}: {} rows read, {} normalized, {} coercion failures",
        path.display(),
        metadata.rows_read,
        metadata.rows_normalized,
        metadata.coercion_failures
    );

    Ok(ScheduleSnapshot { table, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
