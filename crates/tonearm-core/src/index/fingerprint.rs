//! Fingerprint index trait.

use std::path::Path;
use std::sync::Arc;

use super::QueryMatch;
use crate::Result;
use crate::audio::{AudioId, AudioInfo};

/// An index mapping asset identifiers to descriptors, searchable by the
/// fingerprint of an audio file.
///
/// Calls are synchronous: implementations are expected to be local or to
/// block internally. Every method may be called concurrently.
pub trait FingerprintIndex: Send + Sync {
    /// Registers `info` under `id`, fingerprinting the file at `path`.
    ///
    /// `path` is `None` when the asset is not present locally; whether such
    /// a registration is accepted is up to the implementation. Returns the
    /// index's own success flag.
    fn store(&self, id: AudioId, path: Option<&Path>, info: &AudioInfo) -> Result<bool>;

    /// Returns the best match for the audio at `path`.
    ///
    /// Fails with [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when
    /// nothing matches.
    fn query(&self, path: &Path) -> Result<QueryMatch>;

    /// Returns every match for the audio at `path`, best first.
    fn query_list(&self, path: &Path) -> Result<Vec<QueryMatch>>;

    /// Returns the descriptor registered under `id`.
    fn describe(&self, id: AudioId) -> Result<AudioInfo>;
}

impl<T: FingerprintIndex + ?Sized> FingerprintIndex for Arc<T> {
    fn store(&self, id: AudioId, path: Option<&Path>, info: &AudioInfo) -> Result<bool> {
        (**self).store(id, path, info)
    }

    fn query(&self, path: &Path) -> Result<QueryMatch> {
        (**self).query(path)
    }

    fn query_list(&self, path: &Path) -> Result<Vec<QueryMatch>> {
        (**self).query_list(path)
    }

    fn describe(&self, id: AudioId) -> Result<AudioInfo> {
        (**self).describe(id)
    }
}
