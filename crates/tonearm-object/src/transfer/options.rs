//! Per-transfer options.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{ProgressObserver, TransferProgress, TransferStatus};

/// Default size of each streamed chunk (8 MiB).
///
/// Multipart backends require parts of at least 5 MiB except for the last.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Optional knobs for a single upload or download.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    observer: Option<Arc<dyn ProgressObserver>>,
    cancellation: Option<CancellationToken>,
    chunk_size: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            observer: None,
            cancellation: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TransferOptions {
    /// Creates options with no observer, no cancellation and the default chunk size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports progress to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Reports progress to a shared observer.
    #[must_use]
    pub fn with_shared_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stops the transfer once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Sets the streaming chunk size in bytes; zero falls back to the default.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }

    /// Returns the streaming chunk size in bytes.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns `true` once the cancellation token, if any, has fired.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    pub(crate) fn report(&self, status: TransferStatus, bytes: u64, total: Option<u64>) {
        if let Some(observer) = &self.observer {
            observer.on_progress(&TransferProgress::new(status, bytes, total));
        }
    }
}
