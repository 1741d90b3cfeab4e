use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Descriptive analytics over a university course-schedule spreadsheet
#[derive(Parser, Debug, Clone)]
#[command(
    name = "schedule-dash",
    about = "Descriptive analytics over a university course-schedule spreadsheet",
    version
)]
pub struct Settings {
    /// Path to the schedule spreadsheet (.xlsx)
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Dashboard view to render
    #[arg(long, default_value = "all", value_parser = ["academics", "faculty", "facilities", "all"])]
    pub view: String,

    /// Comma-separated college filter (default: all colleges)
    #[arg(long, value_delimiter = ',')]
    pub colleges: Option<Vec<String>>,

    /// Exclude placeholder-time sections (Time = "00:00 - 00:00")
    #[arg(long)]
    pub exclude_placeholder_times: bool,

    /// Restrict to sections with this KIMEP credit weight
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..=3))]
    pub credits: Option<u32>,

    /// Write the full normalized table as CSV to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.schedule-dash/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colleges: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.schedule-dash/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".schedule-dash").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, fill unset optional values from the last-used
    /// params file, and persist the merged result for the next run.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(Self::parse(), &LastUsedParams::config_path())
    }

    /// Merge implementation taking already-parsed settings and an explicit
    /// config path, enabling unit tests without spawning subprocesses.
    pub fn load_with_last_used_impl(mut settings: Self, config_path: &std::path::Path) -> Self {
        if settings.clear {
            if let Err(err) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Failed to clear saved configuration: {}", err);
            }
            return settings;
        }

        let last_used = LastUsedParams::load_from(config_path);

        // CLI defaults lose to a remembered value; explicit values win and
        // are what gets remembered.
        if settings.view == "all" {
            if let Some(view) = last_used.view {
                settings.view = view;
            }
        }
        if settings.colleges.is_none() {
            settings.colleges = last_used.colleges;
        }
        if settings.log_level == "INFO" {
            if let Some(level) = last_used.log_level {
                settings.log_level = level;
            }
        }

        let to_save = LastUsedParams {
            view: Some(settings.view.clone()),
            colleges: settings.colleges.clone(),
            log_level: Some(settings.log_level.clone()),
        };
        if let Err(err) = to_save.save_to(config_path) {
            tracing::warn!("Failed to persist last-used parameters: {}", err);
        }

        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
