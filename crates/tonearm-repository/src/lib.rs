#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for coordinator operations.
pub const TRACING_TARGET_REPOSITORY: &str = "tonearm_repository::repository";

/// Tracing target for the local cache.
pub const TRACING_TARGET_CACHE: &str = "tonearm_repository::cache";

mod cache;
mod config;
mod error;
mod layout;
mod repository;

#[doc(hidden)]
pub mod prelude;

pub use cache::CacheDir;
pub use config::RepositoryConfig;
pub use error::{Error, Result};
pub use layout::KeyLayout;
pub use repository::{AudioRepository, SyncOutcome};
