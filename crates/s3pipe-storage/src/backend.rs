//! Storage backend implementation.

use opendal::{Operator, services};
use s3pipe_core::{BoxedError, ObjectSink, PutObject};

use crate::TRACING_TARGET;
use crate::config::S3Config;
use crate::error::{StorageError, StorageResult};

/// S3 storage backend that wraps an OpenDAL operator.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    bucket: String,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    ///
    /// Only the credentials in `config` are used; credential discovery from
    /// the environment, profile files and instance metadata is disabled.
    pub fn new(config: &S3Config) -> StorageResult<Self> {
        let operator = Self::create_operator(config)?;

        tracing::info!(
            target: TRACING_TARGET,
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            region = %config.region,
            "Storage backend initialized"
        );

        Ok(Self::from_operator(operator, &config.bucket))
    }

    /// Wraps an already configured operator serving `bucket`.
    pub fn from_operator(operator: Operator, bucket: impl Into<String>) -> Self {
        Self {
            operator,
            bucket: bucket.into(),
        }
    }

    /// Returns the bucket this backend writes to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Writes a single object, replacing any existing object at the key.
    pub async fn write(&self, request: &PutObject) -> StorageResult<()> {
        if request.bucket != self.bucket {
            return Err(StorageError::invalid_path(format!(
                "bucket '{}' is not served by this backend (expected '{}')",
                request.bucket, self.bucket
            )));
        }

        // OpenDAL normalizes these, so the object would land under another key.
        let key = request.key.as_str();
        if key.is_empty() || key.starts_with('/') || key.ends_with('/') || key.contains("//") {
            return Err(StorageError::invalid_path(format!(
                "key '{key}' is not a canonical object key"
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %request.bucket,
            key = %request.key,
            size = request.content_length(),
            metadata_keys = request.metadata.len(),
            "Writing object"
        );

        let mut write = self
            .operator
            .write_with(&request.key, request.payload.clone());

        if !request.metadata.is_empty() {
            write = write.user_metadata(request.metadata.clone());
        }

        if let Some(ref content_type) = request.content_type {
            write = write.content_type(content_type);
        }

        write.await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %request.key,
            "Object write complete"
        );

        Ok(())
    }

    /// Reads an object back from storage.
    pub async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        Ok(self.operator.read(key).await?.to_vec())
    }

    /// Creates an OpenDAL S3 operator based on configuration.
    fn create_operator(config: &S3Config) -> StorageResult<Operator> {
        if !config.endpoint.starts_with("https://") {
            return Err(StorageError::init(format!(
                "endpoint '{}' must use https",
                config.endpoint
            )));
        }

        let builder = services::S3::default()
            .bucket(&config.bucket)
            .endpoint(&config.endpoint)
            .region(&config.region)
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key)
            .disable_config_load()
            .disable_ec2_metadata();

        Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| StorageError::init(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ObjectSink for StorageBackend {
    async fn put_object(&self, request: PutObject) -> Result<(), BoxedError> {
        self.write(&request).await.map_err(BoxedError::from)
    }
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("scheme", &self.operator.info().scheme())
            .field("bucket", &self.bucket)
            .finish()
    }
}
