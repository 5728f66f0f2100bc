#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client-level operations.
pub const TRACING_TARGET_CLIENT: &str = "tonearm_object::client";

/// Tracing target for upload and download streaming.
pub const TRACING_TARGET_TRANSFER: &str = "tonearm_object::transfer";

/// Tracing target for bucket providers.
pub const TRACING_TARGET_PROVIDER: &str = "tonearm_object::provider";

pub mod blocking;
pub mod client;
pub mod config;
/// Bucket providers for GCS, the local filesystem and memory.
pub mod providers;
mod storage;
/// Progress reporting and cancellation.
pub mod transfer;
/// Inlined types (Error, BucketCreation).
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use blocking::BlockingStorage;
pub use client::StorageClient;
pub use config::StorageConfig;
pub use storage::ObjectStorage;
pub use types::{Error, Result};
