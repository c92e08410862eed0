//! Storage error types.

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to initialize the storage backend.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// Bucket or object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials were rejected or lack permission.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Request targets a bucket or key this backend cannot write.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Transport or server-side failure reported by the S3 client.
    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl StorageError {
    /// Creates a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a new invalid path error.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opendal_kinds_are_classified() {
        let err = StorageError::from(opendal::Error::new(
            opendal::ErrorKind::PermissionDenied,
            "signature mismatch",
        ));
        assert!(matches!(err, StorageError::PermissionDenied(_)));

        let err = StorageError::from(opendal::Error::new(
            opendal::ErrorKind::NotFound,
            "no such bucket",
        ));
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = StorageError::from(opendal::Error::new(
            opendal::ErrorKind::Unexpected,
            "connection reset",
        ));
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
