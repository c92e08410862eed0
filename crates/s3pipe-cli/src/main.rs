#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod export;
mod telemetry;

use std::{env, process};

use s3pipe_core::{ExportError, ExportReport, ExportResult};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "s3pipe_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "s3pipe_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "s3pipe_cli::config";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = telemetry::init_tracing() {
        eprintln!("Warning: {error:#}");
    }

    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(target: TRACING_TARGET_SHUTDOWN, tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            stage = %error.stage(),
            error_code = error.error_code(),
            "Export failed during {} stage: {error}",
            error.stage()
        );
    } else {
        eprintln!("Error: export failed during {} stage: {error}", error.stage());
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> ExportResult<()> {
    let Some(cli) = Cli::init()? else {
        return Ok(());
    };
    cli.log();

    let cwd = env::current_dir()
        .map_err(|e| ExportError::usage(format!("cannot determine working directory: {e}")))?;

    let report = export::run(&cli, &cwd).await?;
    log_report(&report);

    Ok(())
}

/// Logs the summary of a successful export.
fn log_report(report: &ExportReport) {
    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        bucket = %report.bucket,
        key = %report.key,
        bytes = report.bytes,
        exit_code = ?report.exit_code,
        command_ms = report.command_elapsed.as_millis() as u64,
        upload_ms = report.upload_elapsed.as_millis() as u64,
        "Export completed successfully."
    );
}
