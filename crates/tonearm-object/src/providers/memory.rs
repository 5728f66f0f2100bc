//! In-process provider backed by [`object_store::memory::InMemory`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use object_store::ObjectStore;
use object_store::memory::InMemory;

use super::{BucketProvider, validate_bucket_name};
use crate::TRACING_TARGET_PROVIDER;
use crate::types::{BucketCreation, Error, Result};

/// Buckets held in memory for the lifetime of the provider.
///
/// Opening a bucket that was never created fails with
/// [`Error::BucketNotFound`], the same as a real backend would.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    buckets: Mutex<BTreeMap<String, Arc<InMemory>>>,
    creations: AtomicUsize,
}

impl MemoryProvider {
    /// Creates a provider with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty bucket without counting it as a creation.
    #[must_use]
    pub fn with_bucket(self, bucket: impl Into<String>) -> Self {
        self.buckets()
            .entry(bucket.into())
            .or_insert_with(|| Arc::new(InMemory::new()));
        self
    }

    /// Number of buckets created through [`BucketProvider::create_bucket`].
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    /// Names of all buckets, sorted.
    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets().keys().cloned().collect()
    }

    fn buckets(&self) -> MutexGuard<'_, BTreeMap<String, Arc<InMemory>>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl BucketProvider for MemoryProvider {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn open(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let store = self
            .buckets()
            .get(bucket)
            .cloned()
            .ok_or_else(|| Error::BucketNotFound {
                bucket: bucket.to_string(),
            })?;

        Ok(store)
    }

    async fn bucket_exists(&self, prefix: &str) -> Result<bool> {
        Ok(self.buckets().keys().any(|name| name.starts_with(prefix)))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<BucketCreation> {
        validate_bucket_name(bucket)?;

        let mut buckets = self.buckets();
        if buckets.contains_key(bucket) {
            return Ok(BucketCreation::AlreadyExists);
        }

        buckets.insert(bucket.to_string(), Arc::new(InMemory::new()));
        self.creations.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            bucket = %bucket,
            "In-memory bucket created"
        );

        Ok(BucketCreation::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_is_idempotent() {
        let provider = MemoryProvider::new();

        let first = provider.create_bucket("audio").await.unwrap();
        let second = provider.create_bucket("audio").await.unwrap();

        assert_eq!(first, BucketCreation::Created);
        assert_eq!(second, BucketCreation::AlreadyExists);
        assert_eq!(provider.creations(), 1);
        assert_eq!(provider.bucket_names(), vec!["audio".to_string()]);
    }

    #[tokio::test]
    async fn open_requires_existing_bucket() {
        let provider = MemoryProvider::new().with_bucket("present");

        assert!(provider.open("present").await.is_ok());
        let err = provider.open("absent").await.err().unwrap();
        assert!(matches!(err, Error::BucketNotFound { .. }));
        assert_eq!(provider.creations(), 0);
    }

    #[tokio::test]
    async fn bucket_exists_matches_prefix() {
        let provider = MemoryProvider::new().with_bucket("audio-eu");

        assert!(provider.bucket_exists("audio").await.unwrap());
        assert!(provider.bucket_exists("audio-eu").await.unwrap());
        assert!(!provider.bucket_exists("video").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_invalid_names() {
        let provider = MemoryProvider::new();
        let err = provider.create_bucket("a/b").await.unwrap_err();
        assert!(matches!(err, Error::InvalidBucket { .. }));
    }
}
