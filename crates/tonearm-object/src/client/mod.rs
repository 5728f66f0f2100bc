//! Unified storage client backed by [`object_store::ObjectStore`].
//!
//! [`StorageClient`] is a thin, cloneable wrapper around a
//! [`BucketProvider`] that opens one object store per bucket on first use
//! and implements [`ObjectStorage`] on top of them. Every network-facing
//! method is instrumented with [`tracing`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use futures::TryStreamExt;
use object_store::path::{Path as ObjectPath, PathPart};
use object_store::{Attribute, Attributes, ObjectStore};
use tonearm_core::content::ContentType;

use crate::config::StorageConfig;
use crate::providers::{BucketProvider, GcsProvider, LocalProvider, MemoryProvider};
use crate::storage::ObjectStorage;
use crate::transfer::TransferOptions;
use crate::types::{Error, Result, from_object_store};
use crate::{TRACING_TARGET_CLIENT, TRACING_TARGET_TRANSFER};

mod download;
mod upload;

/// Cloneable handle to the buckets of one storage backend.
///
/// Clones share the provider and the cache of opened buckets.
#[derive(Clone)]
pub struct StorageClient {
    provider: Arc<dyn BucketProvider>,
    stores: Arc<RwLock<HashMap<String, Arc<dyn ObjectStore>>>>,
}

impl StorageClient {
    /// Wraps a concrete [`BucketProvider`].
    pub fn new(provider: impl BucketProvider) -> Self {
        Self::from_provider(Arc::new(provider))
    }

    /// Wraps a shared [`BucketProvider`].
    pub fn from_provider(provider: Arc<dyn BucketProvider>) -> Self {
        Self {
            provider,
            stores: Arc::default(),
        }
    }

    /// Creates a client for the configured backend.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        config.validate()?;

        let client = match config {
            StorageConfig::Gcs(gcs) => Self::new(GcsProvider::new(gcs.clone())?),
            StorageConfig::Local(local) => Self::new(LocalProvider::new(local)?),
            StorageConfig::Memory => Self::new(MemoryProvider::new()),
        };

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            backend = config.backend_name(),
            "Storage client initialized"
        );

        Ok(client)
    }

    /// Returns the provider's backend name.
    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Returns the object store for `bucket`, opening it on first use.
    async fn store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let cached = self
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(bucket)
            .cloned();
        if let Some(store) = cached {
            return Ok(store);
        }

        let store = self.provider.open(bucket).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            backend = self.provider.id(),
            bucket = %bucket,
            "Bucket opened"
        );

        let store = self
            .stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(bucket.to_string())
            .or_insert(store)
            .clone();

        Ok(store)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for StorageClient {
    #[tracing::instrument(
        name = "object.exists",
        skip_all,
        target = TRACING_TARGET_CLIENT,
        fields(bucket = %bucket, key = %key)
    )]
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let store = self.store(bucket).await?;

        // Exact key first; most lookups name a full object.
        if !key.is_empty() {
            match store.head(&ObjectPath::from(key)).await {
                Ok(_) => return Ok(true),
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(from_object_store("exists", e)),
            }
        }

        // Prefix semantics are string-based, so list the parent "directory"
        // and compare full keys in their stored, encoded form.
        let parent = key.rsplit_once('/').map(|(dir, _)| ObjectPath::from(dir));
        let prefix = encoded_prefix(key);
        let mut listing = store.list(parent.as_ref());
        while let Some(meta) = listing
            .try_next()
            .await
            .map_err(|e| from_object_store("exists", e))?
        {
            if meta.location.as_ref().starts_with(&prefix) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    #[tracing::instrument(
        name = "object.bucket_exists",
        skip_all,
        target = TRACING_TARGET_CLIENT,
        fields(bucket = %bucket)
    )]
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.provider.bucket_exists(bucket).await
    }

    #[tracing::instrument(
        name = "object.create_bucket",
        skip_all,
        target = TRACING_TARGET_CLIENT,
        fields(bucket = %bucket)
    )]
    async fn create_bucket(&self, bucket: &str) -> Result<bool> {
        let outcome = self.provider.create_bucket(bucket).await?;

        if outcome.is_created() {
            tracing::info!(
                target: TRACING_TARGET_CLIENT,
                bucket = %bucket,
                "Bucket created"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                bucket = %bucket,
                "Bucket already exists"
            );
        }

        Ok(true)
    }

    #[tracing::instrument(
        name = "object.upload",
        skip_all,
        target = TRACING_TARGET_CLIENT,
        fields(bucket = %bucket, source = %source.display(), destination = %destination)
    )]
    async fn upload(
        &self,
        bucket: &str,
        source: &Path,
        destination: &str,
        options: &TransferOptions,
    ) -> Result<()> {
        let Some(mime) = ContentType::from_path(source).mime() else {
            return Err(Error::InvalidContentType {
                path: source.to_path_buf(),
            });
        };

        let mut attributes = Attributes::new();
        if self.provider.supports_attributes() {
            attributes.insert(Attribute::ContentType, mime.into());
        }

        let store = self.store(bucket).await?;
        let location = ObjectPath::from(destination);
        let sent = upload::put_file(store.as_ref(), &location, source, attributes, options).await?;

        tracing::debug!(
            target: TRACING_TARGET_TRANSFER,
            bucket = %bucket,
            destination = %destination,
            content_type = mime,
            size = sent,
            "Upload complete"
        );

        Ok(())
    }

    #[tracing::instrument(
        name = "object.download",
        skip_all,
        target = TRACING_TARGET_CLIENT,
        fields(bucket = %bucket, source = %source, destination = %destination.display())
    )]
    async fn download(
        &self,
        bucket: &str,
        source: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<()> {
        if options.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let store = self.store(bucket).await?;
        let location = ObjectPath::from(source);
        let received = download::get_file(store.as_ref(), &location, destination, options).await?;

        tracing::debug!(
            target: TRACING_TARGET_TRANSFER,
            bucket = %bucket,
            source = %source,
            size = received,
            "Download complete"
        );

        Ok(())
    }
}

/// Encodes a raw key prefix the way [`ObjectPath::from`] encodes full keys.
///
/// Complete segments are encoded as path parts. The trailing segment may be
/// a partial name, so `.` and `..` are kept literal there instead of being
/// escaped as whole parts.
fn encoded_prefix(key: &str) -> String {
    let (dirs, last) = match key.rsplit_once('/') {
        Some((dirs, last)) => (Some(dirs), last),
        None => (None, key),
    };

    let mut prefix = dirs
        .map(|dirs| ObjectPath::from(dirs).to_string())
        .unwrap_or_default();
    if !prefix.is_empty() {
        prefix.push('/');
    }

    match last {
        "" | "." | ".." => prefix.push_str(last),
        segment => prefix.push_str(PathPart::from(segment).as_ref()),
    }

    prefix
}

impl fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClient")
            .field("backend", &self.provider.id())
            .finish()
    }
}
