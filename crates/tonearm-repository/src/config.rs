//! Repository configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::layout::KeyLayout;
use crate::{Error, Result};

/// Configuration for [`AudioRepository`](crate::AudioRepository).
///
/// Immutable once the repository is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Local cache directory for audio files
    #[cfg_attr(feature = "config", arg(long = "audio-dir", env = "AUDIO_DIR"))]
    pub audio_dir: PathBuf,

    /// Bucket used when a call names none
    #[cfg_attr(
        feature = "config",
        arg(long = "default-bucket", env = "DEFAULT_BUCKET")
    )]
    pub default_bucket: String,

    /// Remote key layout derived from audio descriptors
    #[cfg_attr(
        feature = "config",
        arg(
            long = "key-layout",
            env = "AUDIO_KEY_LAYOUT",
            value_enum,
            default_value_t = KeyLayout::default()
        )
    )]
    #[serde(default)]
    pub key_layout: KeyLayout,
}

impl RepositoryConfig {
    /// Create a new configuration with the default key layout.
    pub fn new(audio_dir: impl Into<PathBuf>, default_bucket: impl Into<String>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            default_bucket: default_bucket.into(),
            key_layout: KeyLayout::default(),
        }
    }

    /// Set the key layout.
    #[must_use]
    pub fn with_key_layout(mut self, key_layout: KeyLayout) -> Self {
        self.key_layout = key_layout;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.audio_dir.as_os_str().is_empty() {
            return Err(Error::invalid_config("audio directory cannot be empty"));
        }

        if self.default_bucket.trim().is_empty() {
            return Err(Error::invalid_config("default bucket cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate() {
        assert!(RepositoryConfig::new("/var/cache/audio", "audio").validate().is_ok());
        assert!(RepositoryConfig::new("", "audio").validate().is_err());
        assert!(RepositoryConfig::new("/var/cache/audio", " ").validate().is_err());
    }

    #[test]
    fn deserializes_with_default_layout() {
        let config: RepositoryConfig =
            serde_json::from_str(r#"{"audioDir":"/cache","defaultBucket":"audio"}"#).unwrap();
        assert_eq!(config.key_layout, KeyLayout::ArtistAlbumTitle);

        let config: RepositoryConfig = serde_json::from_str(
            r#"{"audioDir":"/cache","defaultBucket":"audio","keyLayout":"album-title"}"#,
        )
        .unwrap();
        assert_eq!(config.key_layout, KeyLayout::AlbumTitle);
    }
}
