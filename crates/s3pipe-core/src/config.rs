//! Export configuration and the JSON config loader.
//!
//! A config file looks like this:
//!
//! ```json
//! {
//!   "command": "pg_dump mydb",
//!   "storage": {
//!     "endpoint": "s3.example.com:9000",
//!     "accessKey": "AKIA...",
//!     "secretKey": "...",
//!     "bucket": "backups",
//!     "path": "db/{year}/{month}/{day}/{hour}{minute}{second}.sql",
//!     "metadata": { "origin": "nightly" }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::ExitPolicy;
use crate::error::{ExportError, ExportResult};

/// Tracing target for configuration loading.
pub const TRACING_TARGET: &str = "s3pipe_core::config";

/// Top-level export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Shell command line whose standard output is exported.
    pub command: String,

    /// Shell used to run `command` as `<shell> -c <command>`.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Abort before uploading when the command exits with a nonzero status.
    #[serde(default)]
    pub fail_on_nonzero_exit: bool,

    /// Destination of the captured output.
    pub storage: StorageSettings,
}

/// Object storage destination and credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSettings {
    /// Storage host with optional port, e.g. `s3.example.com:9000`.
    pub endpoint: String,
    /// Access key used to sign requests.
    pub access_key: String,
    /// Secret key used to sign requests.
    pub secret_key: String,
    /// Target bucket.
    pub bucket: String,
    /// Object key template, see [`PathTemplate`](crate::PathTemplate).
    pub path: String,
    /// Region used for request signing.
    #[serde(default = "default_region")]
    pub region: String,
    /// Content type attached to the uploaded object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// User metadata attached to the uploaded object.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

fn default_shell() -> String {
    "sh".to_owned()
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

/// Resolves a config path argument against the given working directory.
pub fn resolve_config_path(arg: impl AsRef<Path>, cwd: impl AsRef<Path>) -> PathBuf {
    let arg = arg.as_ref();
    if arg.is_absolute() {
        arg.to_path_buf()
    } else {
        cwd.as_ref().join(arg)
    }
}

impl ExportConfig {
    /// Reads, decodes and validates the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotFound`] when `path` is not a regular file and
    /// [`ExportError::Parse`] when it cannot be read, decoded or validated.
    pub fn load(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            "Loading configuration file"
        );

        if !fs::metadata(path).is_ok_and(|meta| meta.is_file()) {
            return Err(ExportError::not_found(path));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ExportError::parse_with(format!("failed to read {}", path.display()), e)
        })?;

        let config = Self::from_json(&contents)?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            bucket = %config.storage.bucket,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Decodes and validates a JSON document.
    pub fn from_json(contents: &str) -> ExportResult<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| ExportError::parse_with(e.to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> ExportResult<()> {
        require("command", &self.command)?;
        require("shell", &self.shell)?;
        self.storage.validate()
    }

    /// Returns how a nonzero command exit status is treated.
    pub fn exit_policy(&self) -> ExitPolicy {
        if self.fail_on_nonzero_exit {
            ExitPolicy::Fail
        } else {
            ExitPolicy::Ignore
        }
    }
}

impl StorageSettings {
    /// Validates the storage destination.
    pub fn validate(&self) -> ExportResult<()> {
        require("storage.endpoint", &self.endpoint)?;
        require("storage.accessKey", &self.access_key)?;
        require("storage.secretKey", &self.secret_key)?;
        require("storage.bucket", &self.bucket)?;
        require("storage.path", &self.path)?;
        require("storage.region", &self.region)?;

        if let Some((scheme, _)) = self.endpoint.split_once("://")
            && !scheme.eq_ignore_ascii_case("https")
        {
            return Err(ExportError::parse(format!(
                "storage.endpoint '{}' must use https",
                self.endpoint
            )));
        }

        // Object stores normalize these shapes, so the stored key would differ.
        if self.path.starts_with('/') || self.path.ends_with('/') || self.path.contains("//") {
            return Err(ExportError::parse(format!(
                "storage.path '{}' must not start or end with '/' or contain '//'",
                self.path
            )));
        }

        Ok(())
    }

    /// Returns the endpoint as an `https://` URL.
    pub fn endpoint_url(&self) -> String {
        let host = match self.endpoint.split_once("://") {
            Some((_, rest)) => rest,
            None => self.endpoint.as_str(),
        };
        format!("https://{}", host.trim_end_matches('/'))
    }
}

fn require(field: &str, value: &str) -> ExportResult<()> {
    if value.trim().is_empty() {
        return Err(ExportError::parse(format!("{field} must not be empty")));
    }
    Ok(())
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("path", &self.path)
            .field("region", &self.region)
            .field("content_type", &self.content_type)
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MINIMAL: &str = r#"{
        "command": "echo -n hello",
        "storage": {
            "endpoint": "s3.example.com:9000",
            "accessKey": "access",
            "secretKey": "secret",
            "bucket": "exports",
            "path": "dump-{epoch}.bin"
        }
    }"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ExportConfig::from_json(MINIMAL).unwrap();

        assert_eq!(config.command, "echo -n hello");
        assert_eq!(config.shell, "sh");
        assert_eq!(config.exit_policy(), ExitPolicy::Ignore);
        assert_eq!(config.storage.region, "us-east-1");
        assert!(config.storage.metadata.is_empty());
        assert!(config.storage.content_type.is_none());
    }

    #[test]
    fn metadata_is_decoded_verbatim() {
        let json = r#"{
            "command": "true",
            "failOnNonzeroExit": true,
            "storage": {
                "endpoint": "minio.local",
                "accessKey": "a",
                "secretKey": "s",
                "bucket": "b",
                "path": "p",
                "metadata": { "Origin": "nightly job", "x-team": "data" }
            }
        }"#;
        let config = ExportConfig::from_json(json).unwrap();

        assert_eq!(config.exit_policy(), ExitPolicy::Fail);
        assert_eq!(config.storage.metadata.len(), 2);
        assert_eq!(config.storage.metadata["Origin"], "nightly job");
        assert_eq!(config.storage.metadata["x-team"], "data");
    }

    #[test]
    fn missing_required_field_is_parse_error() {
        let json = r#"{ "storage": { "endpoint": "e", "accessKey": "a",
            "secretKey": "s", "bucket": "b", "path": "p" } }"#;
        let err = ExportConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ExportError::Parse { .. }));
        assert!(err.to_string().contains("command"));
    }

    #[test]
    fn empty_bucket_is_rejected() {
        let json = MINIMAL.replace("\"exports\"", "\"  \"");
        let err = ExportConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = ExportConfig::from_json("{ \"command\": ").unwrap_err();
        assert!(matches!(err, ExportError::Parse { .. }));
    }

    #[test]
    fn plain_http_endpoint_is_rejected() {
        let json = MINIMAL.replace("s3.example.com:9000", "http://s3.example.com");
        assert!(ExportConfig::from_json(&json).is_err());
    }

    #[test]
    fn non_canonical_object_keys_are_rejected() {
        for path in ["/dump-{epoch}.bin", "dumps/", "dumps//{epoch}.bin"] {
            let json = MINIMAL.replace("dump-{epoch}.bin", path);
            let err = ExportConfig::from_json(&json).unwrap_err();
            assert!(matches!(err, ExportError::Parse { .. }), "{path}");
            assert!(err.to_string().contains("storage.path"), "{path}");
        }

        let json = MINIMAL.replace("dump-{epoch}.bin", "dumps/{year}/{epoch}.bin");
        assert!(ExportConfig::from_json(&json).is_ok());
    }

    #[test]
    fn endpoint_url_is_always_https() {
        let mut config = ExportConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.storage.endpoint_url(), "https://s3.example.com:9000");

        config.storage.endpoint = "https://s3.example.com/".to_owned();
        assert_eq!(config.storage.endpoint_url(), "https://s3.example.com");
    }

    #[test]
    fn debug_output_hides_secret_key() {
        let config = ExportConfig::from_json(MINIMAL).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn relative_paths_resolve_against_cwd() {
        let resolved = resolve_config_path("conf/export.json", "/srv/app");
        assert_eq!(resolved, PathBuf::from("/srv/app/conf/export.json"));

        let resolved = resolve_config_path("/etc/s3pipe.json", "/srv/app");
        assert_eq!(resolved, PathBuf::from("/etc/s3pipe.json"));
    }

    #[test]
    fn load_reads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = ExportConfig::load(file.path()).unwrap();
        assert_eq!(config.storage.bucket, "exports");
    }

    #[test]
    fn load_rejects_missing_file_and_directories() {
        let dir = tempfile::TempDir::new().unwrap();

        let err = ExportConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ExportError::NotFound { .. }));

        let err = ExportConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::NotFound { .. }));
    }
}
