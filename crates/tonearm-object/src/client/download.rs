//! Streaming file download.

use std::path::Path;

use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::TRACING_TARGET_TRANSFER;
use crate::transfer::{TransferOptions, TransferStatus};
use crate::types::{Error, Result, from_object_store};

/// Streams `location` into `destination`, replacing any existing file.
///
/// The object is requested before the local file is created, so a missing
/// object never leaves an empty file behind. A failed or cancelled transfer
/// removes the partial file. Returns the bytes received.
pub(super) async fn get_file(
    store: &dyn ObjectStore,
    location: &ObjectPath,
    destination: &Path,
    options: &TransferOptions,
) -> Result<u64> {
    let response = store
        .get(location)
        .await
        .map_err(|e| from_object_store("download", e))?;
    let total = response.meta.size;
    let mut stream = response.into_stream();

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = File::create(destination).await?;

    options.report(TransferStatus::Starting, 0, Some(total));

    let mut received = 0u64;
    let outcome: Result<()> = async {
        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| from_object_store("download", e))?
        {
            if options.is_cancelled() {
                return Err(Error::Cancelled);
            }

            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
            options.report(TransferStatus::InProgress, received, Some(total));
        }

        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(err) = outcome {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(destination).await {
            tracing::warn!(
                target: TRACING_TARGET_TRANSFER,
                path = %destination.display(),
                error = %e,
                "Failed to remove partial download"
            );
        }

        options.report(TransferStatus::Failed, received, Some(total));
        return Err(err);
    }

    options.report(TransferStatus::Completed, received, Some(total));
    Ok(received)
}
