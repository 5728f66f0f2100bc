//! Call-recording object storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tonearm_object::providers::MemoryProvider;
use tonearm_object::transfer::TransferOptions;
use tonearm_object::{Error, ObjectStorage, Result, StorageClient};

/// One call made against [`RecordingStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Exists {
        bucket: String,
        key: String,
    },
    BucketExists {
        bucket: String,
    },
    CreateBucket {
        bucket: String,
    },
    Upload {
        bucket: String,
        source: PathBuf,
        destination: String,
    },
    Download {
        bucket: String,
        source: String,
        destination: PathBuf,
    },
}

/// [`ObjectStorage`] over in-memory buckets that records every call.
///
/// Calls are recorded before they are forwarded, so a call that fails is
/// still visible. Uploads and downloads can be made to fail with a
/// non-retryable backend error.
#[derive(Debug)]
pub struct RecordingStorage {
    provider: Arc<MemoryProvider>,
    client: StorageClient,
    calls: Mutex<Vec<StorageCall>>,
    fail_uploads: AtomicBool,
    fail_downloads: AtomicBool,
}

impl RecordingStorage {
    /// Wraps the buckets of `provider`.
    pub fn new(provider: MemoryProvider) -> Self {
        let provider = Arc::new(provider);
        Self {
            client: StorageClient::from_provider(provider.clone()),
            provider,
            calls: Mutex::default(),
            fail_uploads: AtomicBool::new(false),
            fail_downloads: AtomicBool::new(false),
        }
    }

    /// The in-memory buckets behind this storage.
    pub fn provider(&self) -> &MemoryProvider {
        &self.provider
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<StorageCall> {
        self.lock().clone()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.lock().clear();
    }

    /// Makes subsequent uploads fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent downloads fail.
    pub fn fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StorageCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: StorageCall) {
        self.lock().push(call);
    }

    fn injected(operation: &'static str) -> Error {
        Error::backend(operation, std::io::Error::other("injected failure"), false)
    }
}

impl Default for RecordingStorage {
    fn default() -> Self {
        Self::new(MemoryProvider::new())
    }
}

#[async_trait::async_trait]
impl ObjectStorage for RecordingStorage {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        self.record(StorageCall::Exists {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        self.client.exists(bucket, key).await
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.record(StorageCall::BucketExists {
            bucket: bucket.to_string(),
        });
        self.client.bucket_exists(bucket).await
    }

    async fn create_bucket(&self, bucket: &str) -> Result<bool> {
        self.record(StorageCall::CreateBucket {
            bucket: bucket.to_string(),
        });
        self.client.create_bucket(bucket).await
    }

    async fn upload(
        &self,
        bucket: &str,
        source: &Path,
        destination: &str,
        options: &TransferOptions,
    ) -> Result<()> {
        self.record(StorageCall::Upload {
            bucket: bucket.to_string(),
            source: source.to_path_buf(),
            destination: destination.to_string(),
        });

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Self::injected("upload"));
        }
        self.client.upload(bucket, source, destination, options).await
    }

    async fn download(
        &self,
        bucket: &str,
        source: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<()> {
        self.record(StorageCall::Download {
            bucket: bucket.to_string(),
            source: source.to_string(),
            destination: destination.to_path_buf(),
        });

        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(Self::injected("download"));
        }
        self.client
            .download(bucket, source, destination, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let storage = RecordingStorage::new(MemoryProvider::new().with_bucket("audio"));

        assert!(!storage.exists("audio", "A").await.unwrap());
        assert!(storage.create_bucket("other").await.unwrap());

        assert_eq!(
            storage.calls(),
            vec![
                StorageCall::Exists {
                    bucket: "audio".into(),
                    key: "A".into(),
                },
                StorageCall::CreateBucket {
                    bucket: "other".into(),
                },
            ]
        );
        assert_eq!(storage.provider().creations(), 1);
    }

    #[tokio::test]
    async fn injected_upload_failure_is_recorded() {
        let storage = RecordingStorage::new(MemoryProvider::new().with_bucket("audio"));
        storage.fail_uploads(true);

        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("song.mp3");
        std::fs::write(&source, b"ID3").unwrap();

        let err = storage
            .upload("audio", &source, "A/B/C", &TransferOptions::new())
            .await
            .unwrap_err();

        assert!(err.is_backend());
        assert!(!err.is_retryable());
        assert_eq!(storage.calls().len(), 1);
        assert!(!storage.exists("audio", "A/B/C").await.unwrap());
    }
}
