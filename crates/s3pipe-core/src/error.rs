//! Error taxonomy for the export pipeline.

use std::io;
use std::path::{Path, PathBuf};

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for export operations.
pub type ExportResult<T, E = ExportError> = std::result::Result<T, E>;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Command-line argument handling.
    Usage,
    /// Locating, reading and decoding the configuration file.
    Config,
    /// Spawning or supervising the export command.
    Command,
    /// Pushing the captured output to object storage.
    Upload,
}

/// Errors that terminate an export run.
///
/// None of them are retried; each one carries enough context to tell which
/// stage failed and why.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The program was invoked without a usable config path.
    #[error("{0}")]
    Usage(String),

    /// The config path does not exist or is not a regular file.
    #[error("config file not found: {}", path.display())]
    NotFound {
        /// Absolute path that was checked.
        path: PathBuf,
    },

    /// The config file could not be read, decoded or validated.
    #[error("invalid configuration: {message}")]
    Parse {
        /// What was wrong with the configuration.
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// The export command could not be run, or exited unsuccessfully while
    /// the run was configured to fail on a nonzero exit status.
    #[error("command execution failed: {message}")]
    Execution {
        /// What went wrong.
        message: String,
        #[source]
        source: Option<io::Error>,
    },

    /// The object could not be written to storage.
    #[error("upload of '{key}' failed: {source}")]
    Upload {
        /// Resolved object key of the failed upload.
        key: String,
        #[source]
        source: BoxedError,
    },
}

impl ExportError {
    /// Creates a new usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::NotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates a new parse error without an underlying cause.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
            source: None,
        }
    }

    /// Creates a new parse error wrapping the decoder or I/O failure.
    pub fn parse_with(msg: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Parse {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new execution error without an underlying cause.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution {
            message: msg.into(),
            source: None,
        }
    }

    /// Creates an execution error for a child process that could not be spawned.
    pub fn spawn(shell: &str, source: io::Error) -> Self {
        Self::Execution {
            message: format!("could not spawn '{shell}': {source}"),
            source: Some(source),
        }
    }

    /// Creates a new upload error for the given object key.
    pub fn upload(key: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Upload {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Returns the pipeline stage this error belongs to.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Usage(_) => Stage::Usage,
            Self::NotFound { .. } | Self::Parse { .. } => Stage::Config,
            Self::Execution { .. } => Stage::Command,
            Self::Upload { .. } => Stage::Upload,
        }
    }

    /// Returns a unique error code for this error type.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "E001",
            Self::NotFound { .. } => "E002",
            Self::Parse { .. } => "E003",
            Self::Execution { .. } => "E004",
            Self::Upload { .. } => "E005",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_errors() -> Vec<ExportError> {
        vec![
            ExportError::usage("missing config path"),
            ExportError::not_found("/nonexistent/config.json"),
            ExportError::parse("missing field `command`"),
            ExportError::spawn("sh", io::Error::from(io::ErrorKind::NotFound)),
            ExportError::upload("dump.bin", io::Error::other("connection reset")),
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let codes: Vec<_> = all_errors().iter().map(ExportError::error_code).collect();

        for i in 0..codes.len() {
            for j in i + 1..codes.len() {
                assert_ne!(codes[i], codes[j], "Error codes must be unique");
            }
        }
    }

    #[test]
    fn errors_map_to_stages() {
        let stages: Vec<_> = all_errors().iter().map(ExportError::stage).collect();
        assert_eq!(
            stages,
            [
                Stage::Usage,
                Stage::Config,
                Stage::Config,
                Stage::Command,
                Stage::Upload
            ]
        );
        assert_eq!(Stage::Upload.to_string(), "upload");
    }

    #[test]
    fn upload_error_names_the_key() {
        let err = ExportError::upload("backups/2024.sql", io::Error::other("denied"));
        assert_eq!(err.to_string(), "upload of 'backups/2024.sql' failed: denied");
    }
}
