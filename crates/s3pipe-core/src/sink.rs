//! Destination of exported bytes.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::BoxedError;

/// A single object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    /// Target bucket.
    pub bucket: String,
    /// Resolved object key.
    pub key: String,
    /// Object body; its length is the declared content length.
    pub payload: Bytes,
    /// User metadata attached to the object.
    pub metadata: HashMap<String, String>,
    /// Optional `Content-Type` of the object.
    pub content_type: Option<String>,
}

impl PutObject {
    /// Creates a request without metadata or content type.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, payload: Bytes) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            payload,
            metadata: HashMap::new(),
            content_type: None,
        }
    }

    /// Sets the user metadata.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Returns the payload length in bytes.
    pub fn content_length(&self) -> u64 {
        self.payload.len() as u64
    }
}

/// Object storage that captured output is written to.
///
/// Implement this trait to plug in a storage backend.
#[async_trait::async_trait]
pub trait ObjectSink: Send + Sync {
    /// Creates or overwrites the object described by `request`.
    async fn put_object(&self, request: PutObject) -> Result<(), BoxedError>;
}
