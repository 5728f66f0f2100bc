//! Remote object key derivation.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tonearm_core::audio::AudioInfo;

/// How a descriptor maps onto a remote object key.
///
/// Keys are built from descriptor fields only, never from the
/// [`AudioId`](tonearm_core::audio::AudioId). Path separators inside a field
/// are replaced with `_` so every field stays a single key segment, and
/// empty fields are left out of the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum KeyLayout {
    /// `author/album/title`
    #[default]
    ArtistAlbumTitle,
    /// `album/title`
    AlbumTitle,
}

impl KeyLayout {
    /// Builds the destination key for `info`.
    ///
    /// Returns `None` when every field the layout uses is empty.
    pub fn destination_key(&self, info: &AudioInfo) -> Option<String> {
        let segments = match self {
            Self::ArtistAlbumTitle => vec![&info.author, &info.album, &info.title],
            Self::AlbumTitle => vec![&info.album, &info.title],
        };

        let key = segments
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.replace(['/', '\\'], "_"))
            .collect::<Vec<_>>()
            .join("/");

        (!key.is_empty()).then_some(key)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn default_layout() {
        let info = AudioInfo::new("A", "B", "C");
        assert_eq!(KeyLayout::default().destination_key(&info).unwrap(), "A/B/C");
        assert_eq!(KeyLayout::AlbumTitle.destination_key(&info).unwrap(), "B/C");
    }

    #[test]
    fn separators_stay_inside_segments() {
        let info = AudioInfo::new("AC/DC", "Live\\83", "T.N.T.");
        assert_eq!(
            KeyLayout::ArtistAlbumTitle.destination_key(&info).unwrap(),
            "AC_DC/Live_83/T.N.T."
        );
    }

    #[test]
    fn empty_fields_are_skipped() {
        let info = AudioInfo::new("A", "", "Single");
        assert_eq!(KeyLayout::default().destination_key(&info).unwrap(), "A/Single");
        assert_eq!(KeyLayout::AlbumTitle.destination_key(&info).unwrap(), "Single");

        let info = AudioInfo::new("", "", "");
        assert_eq!(KeyLayout::default().destination_key(&info), None);
        assert_eq!(KeyLayout::AlbumTitle.destination_key(&AudioInfo::new("A", "", "")), None);
    }

    #[test]
    fn names_round_trip_through_strum() {
        assert_eq!(KeyLayout::AlbumTitle.to_string(), "album-title");
        assert_eq!(
            KeyLayout::from_str("artist-album-title").unwrap(),
            KeyLayout::ArtistAlbumTitle
        );
    }
}
