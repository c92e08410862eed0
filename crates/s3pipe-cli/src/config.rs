//! Command-line arguments.
//!
//! ```bash
//! s3pipe ./export.json
//!
//! # Or via environment variables
//! S3PIPE_CONFIG=./export.json s3pipe
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use s3pipe_core::{ExportError, ExportResult};

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "s3pipe")]
#[command(about = "Run a shell command and upload its output to S3-compatible storage")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON export configuration.
    #[arg(value_name = "CONFIG_PATH", env = "S3PIPE_CONFIG")]
    pub config: PathBuf,

    /// Abort without uploading when the command exits with a nonzero status.
    ///
    /// Overrides `failOnNonzeroExit` from the configuration file.
    #[arg(long)]
    pub fail_on_nonzero_exit: bool,
}

impl Cli {
    /// Parses the process arguments.
    ///
    /// Returns `Ok(None)` when `--help` or `--version` was printed.
    pub fn init() -> ExportResult<Option<Self>> {
        Self::init_from(std::env::args_os())
    }

    /// Parses the given argument list, the first item being the program name.
    pub fn init_from<I, T>(args: I) -> ExportResult<Option<Self>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(Some(cli)),
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                // Nothing useful can be done if stdout is gone.
                let _ = err.print();
                Ok(None)
            }
            Err(err) => Err(ExportError::usage(err.render().to_string().trim_end())),
        }
    }

    /// Logs the invocation at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            config = %self.config.display(),
            fail_on_nonzero_exit = self.fail_on_nonzero_exit,
            "Build information"
        );
    }
}
