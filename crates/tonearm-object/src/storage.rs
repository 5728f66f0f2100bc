//! The object storage capability consumed by the audio repository.

use std::path::Path;
use std::sync::Arc;

use crate::transfer::TransferOptions;
use crate::types::Result;

/// Bucket-scoped object storage.
///
/// This is the only storage surface the repository depends on; swapping
/// cloud providers means supplying another implementation. Every method
/// may run concurrently with any other.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Returns `true` if at least one object key in `bucket` starts with `key`.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Returns `true` if a bucket whose name starts with `bucket` exists.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Creates `bucket` if needed.
    ///
    /// Returns `true` both when the bucket was created and when it already
    /// existed; any other backend failure is an error.
    async fn create_bucket(&self, bucket: &str) -> Result<bool>;

    /// Streams the local file at `source` to `destination` in `bucket`,
    /// creating or overwriting the object.
    ///
    /// Fails with [`Error::InvalidContentType`](crate::Error::InvalidContentType)
    /// before touching the backend or the file when the extension is not a
    /// known audio type, and with
    /// [`Error::SourceNotFound`](crate::Error::SourceNotFound) when the file
    /// is missing.
    async fn upload(
        &self,
        bucket: &str,
        source: &Path,
        destination: &str,
        options: &TransferOptions,
    ) -> Result<()>;

    /// Streams the object `source` in `bucket` into the local file
    /// `destination`, creating or truncating it.
    ///
    /// Does not check whether `destination` already exists.
    async fn download(
        &self,
        bucket: &str,
        source: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<()>;
}

#[async_trait::async_trait]
impl<T: ObjectStorage + ?Sized> ObjectStorage for Arc<T> {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        (**self).exists(bucket, key).await
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        (**self).bucket_exists(bucket).await
    }

    async fn create_bucket(&self, bucket: &str) -> Result<bool> {
        (**self).create_bucket(bucket).await
    }

    async fn upload(
        &self,
        bucket: &str,
        source: &Path,
        destination: &str,
        options: &TransferOptions,
    ) -> Result<()> {
        (**self).upload(bucket, source, destination, options).await
    }

    async fn download(
        &self,
        bucket: &str,
        source: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<()> {
        (**self).download(bucket, source, destination, options).await
    }
}
