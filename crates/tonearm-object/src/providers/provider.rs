//! Provider trait for bucket-scoped object stores.

use std::sync::Arc;

use object_store::ObjectStore;

use crate::types::{BucketCreation, Result};

/// Factory for bucket-scoped object stores plus the bucket administration
/// that [`ObjectStore`] itself does not cover.
///
/// Implementations translate backend-specific conflict signalling into
/// [`BucketCreation::AlreadyExists`] and report every other failure as an
/// error.
#[async_trait::async_trait]
pub trait BucketProvider: Send + Sync + 'static {
    /// Short backend name used in logs (e.g. `"gcs"`).
    fn id(&self) -> &'static str;

    /// Whether opened stores accept object attributes such as the content
    /// type. Uploads to stores that do not are sent without them.
    fn supports_attributes(&self) -> bool {
        true
    }

    /// Opens an object store scoped to `bucket`.
    async fn open(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>>;

    /// Returns `true` if any bucket whose name starts with `prefix` exists.
    async fn bucket_exists(&self, prefix: &str) -> Result<bool>;

    /// Creates `bucket`, reporting whether it already existed.
    async fn create_bucket(&self, bucket: &str) -> Result<BucketCreation>;
}
