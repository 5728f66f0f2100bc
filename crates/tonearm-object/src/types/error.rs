//! Storage error types.

use std::path::PathBuf;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for storage operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source file's extension has no known audio content type.
    #[error("invalid content type for '{}'", path.display())]
    InvalidContentType { path: PathBuf },

    /// The local file to upload does not exist.
    #[error("source file not found: '{}'", path.display())]
    SourceNotFound { path: PathBuf },

    /// The bucket does not exist in the backend.
    #[error("bucket '{bucket}' not found")]
    BucketNotFound { bucket: String },

    /// The bucket name cannot be used with this backend.
    #[error("invalid bucket name '{bucket}': {reason}")]
    InvalidBucket { bucket: String, reason: String },

    /// Transport, authentication or service failure reported by the backend.
    #[error("storage backend error during {operation}: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: BoxedError,
        retryable: bool,
    },

    /// The transfer was cancelled through its cancellation token.
    #[error("transfer cancelled")]
    Cancelled,

    /// Local filesystem failure while reading or writing transfer data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid storage configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Creates a backend error from any source error.
    pub fn backend(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
        retryable: bool,
    ) -> Self {
        Self::Backend {
            operation,
            source: Box::new(source),
            retryable,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Creates an invalid bucket error.
    pub fn invalid_bucket(bucket: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBucket {
            bucket: bucket.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures reported by the remote backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::BucketNotFound { .. })
    }

    /// Returns `true` if the remote object or bucket does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::BucketNotFound { .. } => true,
            Self::Backend { source, .. } => matches!(
                source.downcast_ref::<object_store::Error>(),
                Some(object_store::Error::NotFound { .. })
            ),
            _ => false,
        }
    }

    /// Whether the caller could reasonably retry this operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { retryable, .. } => *retryable,
            Self::Io(_) => true,
            _ => false,
        }
    }
}

/// Convert an [`object_store::Error`] raised during `operation`.
pub(crate) fn from_object_store(operation: &'static str, err: object_store::Error) -> Error {
    let retryable = !matches!(
        err,
        object_store::Error::NotFound { .. }
            | object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. }
            | object_store::Error::AlreadyExists { .. }
            | object_store::Error::Precondition { .. }
            | object_store::Error::NotSupported { .. }
    );
    Error::backend(operation, err, retryable)
}
