mod bootstrap;

use std::sync::Arc;

use anyhow::Result;
use sales_core::settings::Settings;
use sales_data::reader::load_dataset;
use sales_runtime::session::{filters_from_settings, DashboardSession, SessionState};
use sales_ui::app::App;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::ensure_directories()?;
    let log_path =
        bootstrap::log_destination(&settings.view, settings.log_file.as_deref(), &app_dir);
    bootstrap::setup_logging(&settings.log_level, log_path.as_deref())?;

    tracing::info!("Sales Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Source: {}, Sheet: {}, View: {}, Theme: {}",
        settings.source.display(),
        settings.sheet,
        settings.view,
        settings.theme
    );

    let (dataset, report) =
        load_dataset(&settings.source, &settings.sheet, settings.row_error_policy())?;
    if report.rows_skipped > 0 {
        tracing::warn!(
            "{} of {} rows skipped in {}",
            report.rows_skipped,
            report.rows_read,
            report.source.display()
        );
    }

    let dataset = Arc::new(dataset);
    let filters = filters_from_settings(&dataset, &settings)?;
    let session = DashboardSession::new(Arc::clone(&dataset), filters);

    match settings.view.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&json_output(&session)?)?);
        }

        "tui" => {
            let source_label = settings
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| settings.source.display().to_string());
            let app = App::new(session, &settings.theme, source_label);

            // Ctrl+C is also caught at the OS level in case it arrives while
            // the terminal is not in raw mode.
            tokio::select! {
                result = app.run() => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// The snapshot as JSON, or `{"error": reason}` when the filters select nothing.
fn json_output(session: &DashboardSession) -> Result<serde_json::Value> {
    Ok(match session.state() {
        SessionState::Ready(snapshot) => serde_json::to_value(snapshot)?,
        SessionState::NoData { reason } => json!({ "error": reason }),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
