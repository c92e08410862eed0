//! S3 connection configuration.

use std::fmt;

use s3pipe_core::StorageSettings;

/// S3-compatible storage configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// Region used for request signing.
    pub region: String,
    /// Endpoint URL, always `https://`.
    pub endpoint: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl S3Config {
    /// Creates a new S3 configuration.
    pub fn new(
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: endpoint.into(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = access_key_id.into();
        self.secret_access_key = secret_access_key.into();
        self
    }
}

impl From<&StorageSettings> for S3Config {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(&settings.bucket, &settings.region, settings.endpoint_url())
            .with_credentials(&settings.access_key, &settings.secret_key)
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}
