//! Extension-based MIME resolution.
//!
//! The table covers the audio container formats accepted for upload.
//! Anything else resolves to [`ContentType::Unknown`], which the upload
//! boundary rejects.

use std::fmt;
use std::path::Path;

/// Audio extensions and their MIME types, lowercase and without the dot.
const AUDIO_MIME_TYPES: &[(&str, &str)] = &[
    ("aa", "audio/audible"),
    ("aac", "audio/aac"),
    ("aax", "audio/vnd.audible.aax"),
    ("ac3", "audio/ac3"),
    ("adt", "audio/vnd.dlna.adts"),
    ("adts", "audio/aac"),
    ("aif", "audio/x-aiff"),
    ("aifc", "audio/aiff"),
    ("aiff", "audio/aiff"),
    ("au", "audio/basic"),
    ("caf", "audio/x-caf"),
    ("cdda", "audio/aiff"),
    ("flac", "audio/flac"),
    ("gsm", "audio/x-gsm"),
    ("m3u", "audio/x-mpegurl"),
    ("m3u8", "audio/x-mpegurl"),
    ("m4a", "audio/m4a"),
    ("m4b", "audio/m4b"),
    ("m4p", "audio/m4p"),
    ("m4r", "audio/x-m4r"),
    ("mid", "audio/mid"),
    ("midi", "audio/mid"),
    ("mp3", "audio/mpeg"),
    ("oga", "audio/ogg"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("pls", "audio/scpls"),
    ("ra", "audio/x-pn-realaudio"),
    ("ram", "audio/x-pn-realaudio"),
    ("rmi", "audio/mid"),
    ("rpm", "audio/x-pn-realaudio-plugin"),
    ("sd2", "audio/x-sd2"),
    ("smd", "audio/x-smd"),
    ("smx", "audio/x-smd"),
    ("smz", "audio/x-smd"),
    ("snd", "audio/basic"),
    ("wav", "audio/wav"),
    ("wave", "audio/wav"),
    ("wax", "audio/x-ms-wax"),
    ("wma", "audio/x-ms-wma"),
];

/// MIME type of an audio file, or the `Unknown` sentinel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// A recognised audio container with its MIME type.
    Audio(&'static str),
    /// The extension is missing or not in the table.
    #[default]
    Unknown,
}

impl ContentType {
    /// Resolves an extension (without the leading dot), ignoring case.
    pub fn from_extension(extension: &str) -> Self {
        AUDIO_MIME_TYPES
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map_or(Self::Unknown, |&(_, mime)| Self::Audio(mime))
    }

    /// Resolves the content type of a file name or path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    /// Returns the MIME type, or `None` for [`ContentType::Unknown`].
    #[must_use]
    pub fn mime(&self) -> Option<&'static str> {
        match self {
            Self::Audio(mime) => Some(*mime),
            Self::Unknown => None,
        }
    }

    /// Check if the extension was recognised.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Audio(_))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime().unwrap_or("unknown"))
    }
}
