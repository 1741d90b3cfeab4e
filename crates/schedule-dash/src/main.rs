mod bootstrap;
mod render;

use anyhow::Result;
use schedule_core::settings::Settings;
use schedule_data::export::export_csv;
use schedule_data::filter;
use schedule_data::pipeline::load_schedule;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Schedule Dash v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Input: {}, View: {}", settings.input.display(), settings.view);

    let snapshot = load_schedule(&settings.input)?;
    let mut table = snapshot.table;

    tracing::info!(
        "Snapshot generated at {}: {} rows ({:.3}s load, {:.3}s normalize)",
        snapshot.metadata.generated_at.to_rfc3339(),
        snapshot.metadata.rows_normalized,
        snapshot.metadata.load_time_seconds,
        snapshot.metadata.normalize_time_seconds
    );

    // Row filters, applied only when the column they read was present.
    if let Some(colleges) = &settings.colleges {
        if table.has_column("College") {
            table = filter::filter_by_colleges(&table, colleges)?;
        } else {
            tracing::warn!("College column absent; ignoring --colleges");
        }
    }
    if settings.exclude_placeholder_times {
        if table.has_column("Time") {
            table = filter::exclude_placeholder_times(&table);
        } else {
            tracing::warn!("Time column absent; ignoring --exclude-placeholder-times");
        }
    }
    if let Some(credits) = settings.credits {
        if table.has_column("KIMEP Credit") {
            table = filter::filter_by_credits(&table, credits);
        } else {
            tracing::warn!("KIMEP Credit column absent; ignoring --credits");
        }
    }

    match settings.view.as_str() {
        "academics" => print!("{}", render::render_academics(&table)),
        "faculty" => print!("{}", render::render_faculty(&table)),
        "facilities" => print!("{}", render::render_facilities(&table)),
        "all" => {
            print!("{}", render::render_academics(&table));
            print!("{}", render::render_faculty(&table));
            print!("{}", render::render_facilities(&table));
        }
        unknown => {
            // Unreachable under the CLI value parser; saved params could
            // still carry a stale value.
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    if let Some(export_path) = &settings.export {
        export_csv(&table, export_path)?;
    }

    Ok(())
}
