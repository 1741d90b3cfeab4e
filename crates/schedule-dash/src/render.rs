//! Plain-text rendering of the dashboard views.
//!
//! Each view renders to a `String` so the output can be asserted in
//! tests. A query that fails with the missing-column signal renders as an
//! "insufficient data" note inside its own section and never aborts the
//! rest of the view.

use schedule_core::formatting::{format_number, format_percent, truncate_title};
use schedule_core::models::ScheduleTable;
use schedule_core::Result;
use schedule_data::queries;

/// Course titles longer than this are cut for display.
const TITLE_WIDTH: usize = 40;

// ── Views ──────────────────────────────────────────────────────────────────────

/// The academics view: levels, enrollment, rankings, time distributions.
pub fn render_academics(table: &ScheduleTable) -> String {
    let mut out = String::new();

    section(&mut out, "Course levels", || {
        let counts = queries::level_counts(table)?;
        Ok(vec![
            format!("Total sections   {}", format_number(counts.total as f64, 0)),
            format!("Foundation       {}", format_number(counts.foundation as f64, 0)),
            format!("Undergraduate    {}", format_number(counts.undergraduate as f64, 0)),
            format!("Graduate         {}", format_number(counts.graduate as f64, 0)),
        ])
    });

    section(&mut out, "Enrollment by college", || {
        let rows = queries::enrollment_by_college(table)?;
        Ok(rows
            .into_iter()
            .map(|r| {
                format!(
                    "{:<12} {:>10}  {:>7}",
                    r.college,
                    format_number(r.students, 0),
                    format_percent(r.percentage)
                )
            })
            .collect())
    });

    section(&mut out, "Top general-education courses", || {
        let rows = queries::top_general_education_courses(table, 10)?;
        Ok(course_lines(rows))
    });

    section(&mut out, "Top late registrations", || {
        let rows = queries::top_late_registrations(table, 10)?;
        Ok(course_lines(rows))
    });

    section(&mut out, "Classes by day", || {
        let rows = queries::day_distribution(table)?;
        Ok(rows
            .into_iter()
            .map(|d| {
                format!(
                    "{:<3} {:>6} classes  {:>10} students",
                    d.day,
                    format_number(d.classes as f64, 0),
                    format_number(d.students, 0)
                )
            })
            .collect())
    });

    section(&mut out, "Classes by start hour", || {
        let rows = queries::start_hour_distribution(table)?;
        Ok(rows
            .into_iter()
            .map(|h| format!("{:>2}:00  {}", h.hour, format_number(h.classes as f64, 0)))
            .collect())
    });

    section(&mut out, "Class durations", || {
        let rows = queries::duration_distribution(table)?;
        Ok(rows
            .into_iter()
            .map(|b| {
                format!(
                    "{:>3} min  {:>6}  {:>7}",
                    b.minutes,
                    format_number(b.count as f64, 0),
                    format_percent(b.percentage)
                )
            })
            .collect())
    });

    section(&mut out, "Section occupancy", || {
        let buckets = queries::occupancy_buckets(table)?;
        Ok(vec![
            format!("Under-utilized (<50%)   {}", buckets.under_utilized),
            format!("Optimal (50-90%)        {}", buckets.optimal),
            format!("Over-utilized (>=90%)   {}", buckets.over_utilized),
        ])
    });

    out
}

/// The faculty view: headline workload figures and instructor rankings.
pub fn render_faculty(table: &ScheduleTable) -> String {
    let mut out = String::new();

    section(&mut out, "Faculty summary", || {
        let summary = queries::faculty_summary(table)?;
        let mut lines = vec![format!(
            "Instructors              {}",
            format_number(summary.total_instructors as f64, 0)
        )];
        if let Some(avg) = summary.avg_courses_per_instructor {
            lines.push(format!("Avg courses/instructor   {}", format_number(avg, 1)));
        }
        if let Some(avg) = summary.avg_students_per_instructor {
            lines.push(format!("Avg students/instructor  {}", format_number(avg, 1)));
        }
        Ok(lines)
    });

    section(&mut out, "Instructors by college", || {
        let rows = queries::instructors_by_college(table)?;
        Ok(keyed_count_lines(rows))
    });

    section(&mut out, "Top instructors by courses", || {
        let rows = queries::top_instructors_by_courses(table, 15)?;
        Ok(keyed_count_lines(rows))
    });

    section(&mut out, "Top instructors by students", || {
        let rows = queries::top_instructors_by_students(table, 15)?;
        Ok(rows
            .into_iter()
            .map(|r| format!("{:<32} {:>10}", r.key, format_number(r.total, 0)))
            .collect())
    });

    out
}

/// The facilities view: room stock and building utilisation.
pub fn render_facilities(table: &ScheduleTable) -> String {
    let mut out = String::new();

    section(&mut out, "Room metrics", || {
        let metrics = queries::room_metrics(table)?;
        let mut lines = vec![format!(
            "Rooms          {}",
            format_number(metrics.total_rooms as f64, 0)
        )];
        if let Some(min) = metrics.min_capacity {
            lines.push(format!("Min capacity   {}", format_number(min, 0)));
        }
        if let Some(max) = metrics.max_capacity {
            lines.push(format!("Max capacity   {}", format_number(max, 0)));
        }
        Ok(lines)
    });

    section(&mut out, "Rooms by building", || {
        let rows = queries::rooms_by_building(table)?;
        Ok(keyed_count_lines(rows))
    });

    section(&mut out, "Top rooms by classes", || {
        let rows = queries::top_rooms_by_classes(table, 10)?;
        Ok(keyed_count_lines(rows))
    });

    section(&mut out, "Classes by building", || {
        let rows = queries::classes_by_building(table)?;
        Ok(keyed_count_lines(rows))
    });

    out
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// Render one titled section, degrading a missing-column failure to an
/// inline note.
fn section(out: &mut String, title: &str, body: impl FnOnce() -> Result<Vec<String>>) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');

    match body() {
        Ok(lines) if lines.is_empty() => out.push_str("  (no data)\n"),
        Ok(lines) => {
            for line in lines {
                out.push_str("  ");
                out.push_str(&line);
                out.push('\n');
            }
        }
        Err(err) if err.is_insufficient_data() => {
            out.push_str(&format!("  insufficient data: {}\n", err));
        }
        Err(err) => {
            // Non-schema failures are unexpected here; surface them but
            // keep rendering the remaining sections.
            out.push_str(&format!("  error: {}\n", err));
        }
    }
    out.push('\n');
}

fn course_lines(rows: Vec<queries::CourseMetric>) -> Vec<String> {
    rows.into_iter()
        .map(|r| {
            format!(
                "{:<10} {:<40} {:>8}",
                r.code,
                truncate_title(&r.title, TITLE_WIDTH),
                format_number(r.value, 0)
            )
        })
        .collect()
}

fn keyed_count_lines(rows: Vec<queries::KeyedCount>) -> Vec<String> {
    rows.into_iter()
        .map(|r| format!("{:<32} {:>6}", r.key, format_number(r.count as f64, 0)))
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
