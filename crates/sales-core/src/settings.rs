use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::calendar::DateParser;
use crate::models::RowErrorPolicy;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Interactive sales dashboard over a daily per-store sales spreadsheet
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-dashboard",
    about = "Interactive sales dashboard over a daily per-store sales spreadsheet",
    version
)]
pub struct Settings {
    /// Sales source: an .xlsx/.xls/.ods workbook or a .csv file
    #[arg(long, default_value = "Ventas.xlsx")]
    pub source: PathBuf,

    /// Worksheet holding the sales rows (workbooks only)
    #[arg(long, default_value = "Ventas")]
    pub sheet: String,

    /// First day of the primary period (dd/mm/yyyy or yyyy-mm-dd)
    #[arg(long, value_parser = parse_cli_date)]
    pub start: Option<NaiveDate>,

    /// Last day of the primary period (dd/mm/yyyy or yyyy-mm-dd)
    #[arg(long, value_parser = parse_cli_date)]
    pub end: Option<NaiveDate>,

    /// Comma-separated stores to include (default: all)
    #[arg(long, value_delimiter = ',')]
    pub stores: Vec<String>,

    /// Compare the primary period against a second period
    #[arg(long)]
    pub compare: bool,

    /// First day of the comparison period (default: start minus one year)
    #[arg(long, value_parser = parse_cli_date)]
    pub compare_start: Option<NaiveDate>,

    /// Last day of the comparison period (default: end minus one year)
    #[arg(long, value_parser = parse_cli_date)]
    pub compare_end: Option<NaiveDate>,

    /// What to do with rows that fail to parse
    #[arg(long, default_value = "abort", value_parser = ["abort", "skip"])]
    pub on_row_error: String,

    /// Output mode
    #[arg(long, default_value = "tui", value_parser = ["tui", "json"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

/// clap value parser for day-first dates.
fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    DateParser::parse(s).map_err(|e| e.to_string())
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.sales-dashboard/last_used.json`.
///
/// Filters are deliberately not persisted: every run starts from the full
/// data span and all stores unless the command line says otherwise.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".sales-dashboard").join("last_used.json")
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
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear saved configuration");
            }
            return settings.apply_debug_flag();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "source") {
            if let Some(v) = last.source {
                settings.source = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "sheet") {
            if let Some(v) = last.sheet {
                settings.sheet = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }

        settings = settings.apply_debug_flag();

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "could not persist last-used configuration");
        }

        settings
    }

    /// The loader policy selected by `--on-row-error`.
    pub fn row_error_policy(&self) -> RowErrorPolicy {
        RowErrorPolicy::from_name(&self.on_row_error).unwrap_or_default()
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            source: Some(s.source.clone()),
            sheet: Some(s.sheet.clone()),
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
