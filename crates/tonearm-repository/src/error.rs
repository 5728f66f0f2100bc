//! Repository error types.

/// Result type for repository operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while coordinating the cache, index and storage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The fingerprint index failed or had no match.
    #[error(transparent)]
    Index(#[from] tonearm_core::Error),

    /// The object storage adapter failed.
    #[error(transparent)]
    Storage(#[from] tonearm_object::Error),

    /// A cache file name escapes the cache directory.
    #[error("invalid file name '{name}': {reason}")]
    InvalidFileName { name: String, reason: &'static str },

    /// Every descriptor field the key layout uses is empty.
    #[error("descriptor has no fields to build a remote key from")]
    EmptyKey,

    /// Reading or writing the cache directory failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid repository configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    pub(crate) fn invalid_file_name(name: &str, reason: &'static str) -> Self {
        Self::InvalidFileName {
            name: name.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns `true` when the index has no match or the remote object is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Index(e) => e.is_not_found(),
            Self::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Returns `true` when an upload found no local file.
    pub fn is_source_not_found(&self) -> bool {
        matches!(
            self,
            Self::Storage(tonearm_object::Error::SourceNotFound { .. })
        )
    }

    /// Returns `true` when an upload was rejected for its file extension.
    pub fn is_invalid_content_type(&self) -> bool {
        matches!(
            self,
            Self::Storage(tonearm_object::Error::InvalidContentType { .. })
        )
    }
}
