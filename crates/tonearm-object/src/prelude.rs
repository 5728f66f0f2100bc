//! Convenience re-exports.

pub use crate::blocking::BlockingStorage;
pub use crate::client::StorageClient;
pub use crate::config::StorageConfig;
pub use crate::providers::{
    BucketProvider, GcsConfig, GcsProvider, LocalConfig, LocalProvider, MemoryProvider,
};
pub use crate::storage::ObjectStorage;
pub use crate::transfer::{ProgressObserver, TransferOptions, TransferProgress, TransferStatus};
pub use crate::types::{BucketCreation, Error};
