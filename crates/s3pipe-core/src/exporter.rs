//! The export pipeline: run the command, render the key, upload.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::command::{CommandRunner, ExitPolicy};
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::sink::{ObjectSink, PutObject};
use crate::template::PathTemplate;

/// Tracing target for pipeline progress.
pub const TRACING_TARGET: &str = "s3pipe_core::exporter";

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Bucket the object was written to.
    pub bucket: String,
    /// Resolved object key.
    pub key: String,
    /// Size of the uploaded object.
    pub bytes: u64,
    /// Exit code of the command, `None` if it was killed by a signal.
    pub exit_code: Option<i32>,
    /// Time spent running the command.
    pub command_elapsed: Duration,
    /// Time spent uploading.
    pub upload_elapsed: Duration,
}

/// Runs one export.
///
/// Holds everything from [`ExportConfig`] except the credentials, which stay
/// with the [`ObjectSink`].
#[derive(Debug, Clone)]
pub struct Exporter<C = SystemClock> {
    command: String,
    runner: CommandRunner,
    policy: ExitPolicy,
    bucket: String,
    template: PathTemplate,
    metadata: HashMap<String, String>,
    content_type: Option<String>,
    clock: C,
}

impl Exporter {
    /// Creates an exporter using the system clock.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            command: config.command.clone(),
            runner: CommandRunner::new(config.shell.clone()),
            policy: config.exit_policy(),
            bucket: config.storage.bucket.clone(),
            template: PathTemplate::new(config.storage.path.clone()),
            metadata: config.storage.metadata.clone(),
            content_type: config.storage.content_type.clone(),
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Exporter<C> {
    /// Replaces the clock used to render the object key.
    pub fn with_clock<D: Clock>(self, clock: D) -> Exporter<D> {
        Exporter {
            command: self.command,
            runner: self.runner,
            policy: self.policy,
            bucket: self.bucket,
            template: self.template,
            metadata: self.metadata,
            content_type: self.content_type,
            clock,
        }
    }

    /// Overrides how a nonzero exit status is handled.
    pub fn with_exit_policy(mut self, policy: ExitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the command and uploads its output to `sink`.
    ///
    /// The object key is rendered once, after the command has finished.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Execution`] if the command cannot be spawned (or
    /// fails under [`ExitPolicy::Fail`]) and [`ExportError::Upload`] if the
    /// sink rejects the object.
    pub async fn run(&self, sink: &dyn ObjectSink) -> ExportResult<ExportReport> {
        tracing::info!(target: TRACING_TARGET, "Running export command...");

        let output = self.runner.run(&self.command).await?;

        tracing::info!(
            target: TRACING_TARGET,
            exit_code = ?output.exit_code,
            captured_bytes = output.stdout.len(),
            "Command execution took {:.2} ms",
            millis(output.elapsed)
        );

        output.check(self.policy)?;

        tracing::debug!(
            target: TRACING_TARGET,
            template = %self.template.as_str(),
            placeholders = ?self.template.placeholders(),
            "Rendering object key"
        );

        let key = self.template.render(self.clock.now());
        tracing::info!(target: TRACING_TARGET, bucket = %self.bucket, "Saving to S3 path: {key}");

        let request = PutObject::new(self.bucket.clone(), key.clone(), output.stdout.clone())
            .with_metadata(self.metadata.clone())
            .with_content_type(self.content_type.clone());
        let bytes = request.content_length();

        tracing::info!(target: TRACING_TARGET, bytes, "Uploading file to S3...");

        let started = Instant::now();
        sink.put_object(request)
            .await
            .map_err(|e| ExportError::upload(key.clone(), e))?;
        let upload_elapsed = started.elapsed();

        tracing::info!(
            target: TRACING_TARGET,
            "File upload took {:.2} ms",
            millis(upload_elapsed)
        );

        Ok(ExportReport {
            bucket: self.bucket.clone(),
            key,
            bytes,
            exit_code: output.exit_code,
            command_elapsed: output.elapsed,
            upload_elapsed,
        })
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
