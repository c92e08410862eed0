//! Wiring of config, storage backend and exporter for a single run.

use std::path::Path;

use s3pipe_core::{
    ExitPolicy, ExportConfig, ExportError, ExportReport, ExportResult, Exporter,
    resolve_config_path,
};
use s3pipe_storage::{S3Config, StorageBackend};

use crate::TRACING_TARGET_CONFIG;
use crate::config::Cli;

/// Loads the configuration named on the command line and runs one export.
///
/// The config path is resolved against `cwd`. Everything that can be
/// validated without side effects is checked before the command runs.
pub async fn run(cli: &Cli, cwd: &Path) -> ExportResult<ExportReport> {
    let path = resolve_config_path(&cli.config, cwd);
    let config = ExportConfig::load(&path)?;

    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        path = %path.display(),
        endpoint = %config.storage.endpoint,
        bucket = %config.storage.bucket,
        template = %config.storage.path,
        shell = %config.shell,
        metadata_keys = config.storage.metadata.len(),
        "Export configuration"
    );

    let backend = StorageBackend::new(&S3Config::from(&config.storage))
        .map_err(|e| ExportError::parse_with("invalid storage configuration", e))?;

    let mut exporter = Exporter::new(&config);
    if cli.fail_on_nonzero_exit {
        exporter = exporter.with_exit_policy(ExitPolicy::Fail);
    }

    exporter.run(&backend).await
}
