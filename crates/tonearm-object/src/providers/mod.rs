//! Bucket providers: backend-specific bucket administration and per-bucket
//! [`ObjectStore`](object_store::ObjectStore) construction.

mod gcs;
mod local;
mod memory;
mod provider;

pub use gcs::{GcsConfig, GcsProvider};
pub use local::{LocalConfig, LocalProvider};
pub use memory::MemoryProvider;
pub use provider::BucketProvider;

use crate::types::{Error, Result};

/// Rejects bucket names that cannot map onto a single path segment.
pub(crate) fn validate_bucket_name(bucket: &str) -> Result<()> {
    if bucket.trim().is_empty() {
        return Err(Error::invalid_bucket(bucket, "bucket name cannot be empty"));
    }

    if bucket == "." || bucket == ".." {
        return Err(Error::invalid_bucket(bucket, "bucket name cannot be a relative path"));
    }

    if bucket.contains(['/', '\\']) {
        return Err(Error::invalid_bucket(bucket, "bucket name cannot contain path separators"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_names() {
        assert!(validate_bucket_name("audio-assets").is_ok());
        assert!(validate_bucket_name("").is_err());
        assert!(validate_bucket_name("..").is_err());
        assert!(validate_bucket_name("a/b").is_err());
        assert!(validate_bucket_name("a\\b").is_err());
    }
}
