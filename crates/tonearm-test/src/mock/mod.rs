//! In-memory implementations of the index and storage capabilities.
//!
//! Both doubles keep their state behind a mutex so they can be shared
//! across tasks, and expose what they saw for assertions.

mod index;
mod storage;

pub use index::{MemoryIndex, MemoryIndexConfig, StoredEntry};
pub use storage::{RecordingStorage, StorageCall};
