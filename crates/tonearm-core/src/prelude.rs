//! Prelude module for convenient imports.

pub use crate::audio::{AudioId, AudioInfo};
pub use crate::content::ContentType;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::index::{FingerprintIndex, QueryMatch};
