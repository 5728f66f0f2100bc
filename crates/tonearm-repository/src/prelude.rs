//! Convenience re-exports.

pub use tonearm_core::audio::{AudioId, AudioInfo};
pub use tonearm_object::transfer::TransferOptions;

pub use crate::{AudioRepository, Error, KeyLayout, RepositoryConfig, SyncOutcome};
