//! Path-derived asset identifiers.

use std::path::Path;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifier of a registered audio asset.
///
/// Derived from the asset's local path with [`AudioId::from_path`]. The
/// derivation is deterministic across processes, but distinct paths may
/// collide and nothing here disambiguates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, From, Into)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioId(u64);

impl AudioId {
    /// Wraps a raw identifier, e.g. one returned by a fingerprint index.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Derives the identifier for an asset path.
    ///
    /// Hashes the path exactly as given: `song.mp3` and `./song.mp3` are
    /// different paths and produce different identifiers.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let digest = Sha256::digest(path.as_ref().as_os_str().as_encoded_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(prefix))
    }

    /// Returns the raw identifier value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}
