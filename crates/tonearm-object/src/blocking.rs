//! Synchronous facade over [`ObjectStorage`].
//!
//! [`BlockingStorage`] owns a current-thread Tokio runtime and drives each
//! call to completion on it. It must not be used from inside an async
//! context; Tokio panics when a runtime is blocked on from within another.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::storage::ObjectStorage;
use crate::transfer::TransferOptions;
use crate::types::Result;

/// Blocking handle to any [`ObjectStorage`] implementation.
pub struct BlockingStorage {
    inner: Arc<dyn ObjectStorage>,
    runtime: Runtime,
}

impl BlockingStorage {
    /// Wraps `storage` with a dedicated runtime.
    pub fn new(storage: impl ObjectStorage + 'static) -> Result<Self> {
        Self::from_shared(Arc::new(storage))
    }

    /// Wraps shared `storage` with a dedicated runtime.
    pub fn from_shared(storage: Arc<dyn ObjectStorage>) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner: storage,
            runtime,
        })
    }

    /// Returns the wrapped async storage.
    pub fn inner(&self) -> &Arc<dyn ObjectStorage> {
        &self.inner
    }

    /// See [`ObjectStorage::exists`].
    pub fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.exists(bucket, key))
    }

    /// See [`ObjectStorage::bucket_exists`].
    pub fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.bucket_exists(bucket))
    }

    /// See [`ObjectStorage::create_bucket`].
    pub fn create_bucket(&self, bucket: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.create_bucket(bucket))
    }

    /// See [`ObjectStorage::upload`].
    pub fn upload(
        &self,
        bucket: &str,
        source: &Path,
        destination: &str,
        options: &TransferOptions,
    ) -> Result<()> {
        self.runtime
            .block_on(self.inner.upload(bucket, source, destination, options))
    }

    /// See [`ObjectStorage::download`].
    pub fn download(
        &self,
        bucket: &str,
        source: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<()> {
        self.runtime
            .block_on(self.inner.download(bucket, source, destination, options))
    }
}

impl fmt::Debug for BlockingStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StorageClient;
    use crate::providers::MemoryProvider;

    #[test]
    fn blocking_roundtrip() {
        let storage = BlockingStorage::new(StorageClient::new(MemoryProvider::new())).unwrap();
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("take.mp3");
        std::fs::write(&source, b"ID3").unwrap();

        assert!(!storage.bucket_exists("audio").unwrap());
        assert!(storage.create_bucket("audio").unwrap());
        assert!(storage.bucket_exists("audio").unwrap());

        storage
            .upload("audio", &source, "A/B/C", &TransferOptions::new())
            .unwrap();
        assert!(storage.exists("audio", "A/B").unwrap());

        let destination = temp.path().join("copy.mp3");
        storage
            .download("audio", "A/B/C", &destination, &TransferOptions::new())
            .unwrap();
        assert_eq!(std::fs::read(destination).unwrap(), b"ID3");
    }

    #[test]
    fn errors_pass_through() {
        let storage = BlockingStorage::new(StorageClient::new(MemoryProvider::new())).unwrap();
        let err = storage.exists("missing", "key").unwrap_err();
        assert!(err.is_not_found());
    }
}
