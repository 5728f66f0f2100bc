//! Progress reporting and cancellation for uploads and downloads.

mod options;
mod progress;

pub use options::{DEFAULT_CHUNK_SIZE, TransferOptions};
pub use progress::{ProgressObserver, TransferProgress, TransferStatus};
