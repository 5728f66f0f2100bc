//! Filesystem provider: every bucket is a directory under a common root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use object_store::ObjectStore;
use object_store::local::LocalFileSystem;
use serde::{Deserialize, Serialize};

use super::{BucketProvider, validate_bucket_name};
use crate::TRACING_TARGET_PROVIDER;
use crate::types::{BucketCreation, Error, Result, from_object_store};

/// Configuration for the filesystem provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct LocalConfig {
    /// Directory holding one sub-directory per bucket
    #[cfg_attr(feature = "config", arg(long = "storage-root", env = "STORAGE_ROOT"))]
    pub root: PathBuf,
}

impl LocalConfig {
    /// Creates a configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(Error::invalid_config("storage root cannot be empty"));
        }

        Ok(())
    }
}

/// Buckets stored as directories under [`LocalConfig::root`].
#[derive(Debug, Clone)]
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    /// Creates a provider rooted at `config.root`.
    pub fn new(config: &LocalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: config.root.clone(),
        })
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        validate_bucket_name(bucket)?;
        Ok(self.root.join(bucket))
    }
}

#[async_trait::async_trait]
impl BucketProvider for LocalProvider {
    fn id(&self) -> &'static str {
        "local"
    }

    // The filesystem store rejects any attribute on write.
    fn supports_attributes(&self) -> bool {
        false
    }

    async fn open(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let dir = self.bucket_dir(bucket)?;

        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(Error::BucketNotFound {
                bucket: bucket.to_string(),
            });
        }

        let store = LocalFileSystem::new_with_prefix(&dir)
            .map_err(|e| from_object_store("open_bucket", e))?;

        Ok(Arc::new(store))
    }

    async fn bucket_exists(&self, prefix: &str) -> Result<bool> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::backend("bucket_exists", e, true)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::backend("bucket_exists", e, true))?
        {
            let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
            if is_dir && entry.file_name().to_string_lossy().starts_with(prefix) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<BucketCreation> {
        let dir = self.bucket_dir(bucket)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::backend("create_bucket", e, true))?;

        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET_PROVIDER,
                    bucket = %bucket,
                    path = %dir.display(),
                    "Bucket directory created"
                );
                Ok(BucketCreation::Created)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let is_dir = tokio::fs::metadata(&dir)
                    .await
                    .is_ok_and(|meta| meta.is_dir());
                if is_dir {
                    Ok(BucketCreation::AlreadyExists)
                } else {
                    Err(Error::invalid_bucket(bucket, "path exists and is not a directory"))
                }
            }
            Err(e) => Err(Error::backend("create_bucket", e, true)),
        }
    }
}
