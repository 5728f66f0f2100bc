//! Descriptive metadata for an audio asset.

use serde::{Deserialize, Serialize};

/// Descriptive metadata registered alongside an asset.
///
/// Author, album and title feed the remote object key. The remaining fields
/// are carried through to the fingerprint index untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInfo {
    /// Performing artist.
    pub author: String,
    /// Album or collection the asset belongs to.
    pub album: String,
    /// Track title.
    pub title: String,
    /// Position on the album, 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<u32>,
    /// Release year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Free-form genre label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Playback length in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl AudioInfo {
    /// Creates a descriptor with the required fields set.
    pub fn new(
        author: impl Into<String>,
        album: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            album: album.into(),
            title: title.into(),
            track: None,
            year: None,
            genre: None,
            duration_ms: None,
        }
    }

    /// Sets the track number.
    #[must_use]
    pub fn with_track(mut self, track: u32) -> Self {
        self.track = Some(track);
        self
    }

    /// Sets the release year.
    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the genre.
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Sets the duration in milliseconds.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}
