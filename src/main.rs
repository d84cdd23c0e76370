//! CLI entry point: aggregates a travel-survey trips CSV into OD matrices.
//!
//! Zone definitions, output directory and formats come from the environment
//! (see [`od_matrix::config`]); the only argument is the trips file.

use anyhow::{Context, Result};
use clap::Parser;
use od_matrix::config::RunConfig;
use od_matrix::pipeline::run;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "od_matrix", version)]
#[command(about = "Aggregate survey trips into an origin-destination matrix", long_about = None)]
struct Cli {
    /// Trip records CSV (columns I, J, Mode, DPurp, Time)
    #[arg(value_name = "TRIPS_FILE")]
    trips_file: PathBuf,
}

fn main() -> Result<()> {
    // usage errors exit here with status 2, before any file is touched
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let _log_guard = init_logging()?;

    let config = RunConfig::from_env().context("invalid configuration")?;
    info!(
        zone_defs = %config.zone_defs.display(),
        output_dir = %config.output_dir.display(),
        formats = ?config.formats,
        "Starting OD matrix run"
    );

    match run(&config, &cli.trips_file) {
        Ok(summary) => {
            info!(
                zones = summary.zones,
                records = summary.records,
                rows = summary.rows,
                files = summary.files.len(),
                "OD matrix run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "OD matrix run failed, no output written");
            Err(e).with_context(|| {
                format!("failed to build OD matrix from {}", cli.trips_file.display())
            })
        }
    }
}

/// Run progress goes to stderr for the operator; a debug-level JSON copy
/// lands in a daily rolling file under `LOG_FILE_PATH` for later inspection.
/// The returned guard flushes that file when dropped.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/od_matrix.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("od_matrix.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}
