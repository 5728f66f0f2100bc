//! Result of a fingerprint query.

use serde::{Deserialize, Serialize};

use crate::audio::AudioId;

/// A single match returned by [`FingerprintIndex::query`](super::FingerprintIndex::query).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMatch {
    /// Identifier of the matched asset.
    pub id: AudioId,
    /// Index-defined match strength; higher is better.
    pub score: u32,
}

impl QueryMatch {
    /// Creates a new match.
    pub fn new(id: AudioId, score: u32) -> Self {
        Self { id, score }
    }
}
