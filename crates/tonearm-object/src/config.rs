//! Storage configuration types.

use serde::{Deserialize, Serialize};

pub use crate::providers::{GcsConfig, LocalConfig};
use crate::types::Result;

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StorageConfig {
    /// Google Cloud Storage.
    Gcs(GcsConfig),
    /// Buckets as directories on the local filesystem.
    Local(LocalConfig),
    /// In-process buckets that vanish with the client.
    Memory,
}

impl StorageConfig {
    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Gcs(_) => "gcs",
            Self::Local(_) => "local",
            Self::Memory => "memory",
        }
    }

    /// Validate the backend-specific configuration.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Gcs(config) => config.validate(),
            Self::Local(config) => config.validate(),
            Self::Memory => Ok(()),
        }
    }
}
