//! Transfer progress events.

use std::fmt;

/// Lifecycle stage of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// The transfer is about to move its first byte.
    Starting,
    /// Bytes are flowing.
    InProgress,
    /// All bytes were transferred and committed.
    Completed,
    /// The transfer stopped early, including by cancellation.
    Failed,
}

/// A progress snapshot delivered to a [`ProgressObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Current lifecycle stage.
    pub status: TransferStatus,
    /// Bytes moved so far.
    pub bytes_transferred: u64,
    /// Total size, when the source reports one.
    pub total_bytes: Option<u64>,
}

impl TransferProgress {
    pub(crate) fn new(status: TransferStatus, bytes_transferred: u64, total_bytes: Option<u64>) -> Self {
        Self {
            status,
            bytes_transferred,
            total_bytes,
        }
    }

    /// Fraction completed in `0.0..=1.0`, if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some(self.bytes_transferred as f64 / total as f64),
            None => None,
        }
    }
}

/// Receives progress updates while a transfer runs.
///
/// Called on the task driving the transfer, so implementations should
/// return quickly. Closures taking `&TransferProgress` implement this trait.
pub trait ProgressObserver: Send + Sync {
    /// Handles one progress update.
    fn on_progress(&self, progress: &TransferProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&TransferProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &TransferProgress) {
        self(progress)
    }
}

impl fmt::Debug for dyn ProgressObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressObserver")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn fraction_handles_unknown_and_empty_totals() {
        let progress = TransferProgress::new(TransferStatus::InProgress, 25, Some(100));
        assert_eq!(progress.fraction(), Some(0.25));

        let empty = TransferProgress::new(TransferStatus::Completed, 0, Some(0));
        assert_eq!(empty.fraction(), Some(1.0));

        let unknown = TransferProgress::new(TransferStatus::InProgress, 10, None);
        assert_eq!(unknown.fraction(), None);
    }

    #[test]
    fn closures_are_observers() {
        let seen = Mutex::new(Vec::new());
        let observer = |p: &TransferProgress| seen.lock().unwrap().push(p.status);

        observer.on_progress(&TransferProgress::new(TransferStatus::Starting, 0, None));
        observer.on_progress(&TransferProgress::new(TransferStatus::Completed, 3, Some(3)));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![TransferStatus::Starting, TransferStatus::Completed]
        );
    }
}
