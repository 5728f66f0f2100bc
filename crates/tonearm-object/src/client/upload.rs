//! Streaming file upload.

use std::path::Path;

use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attributes, ObjectStore, PutMultipartOptions, PutOptions, PutPayload, WriteMultipart,
};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::TRACING_TARGET_TRANSFER;
use crate::transfer::{TransferOptions, TransferStatus};
use crate::types::{Error, Result, from_object_store};

/// Size of each local read while streaming a multipart upload.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Parts allowed in flight before reading more of the file.
const MAX_CONCURRENT_PARTS: usize = 4;

/// Uploads `source` to `location` with the given object `attributes`.
///
/// Backends that cannot store attributes must be handed an empty set.
///
/// Files no larger than one chunk go up in a single request; anything
/// bigger is streamed as a multipart upload. Returns the bytes sent.
pub(super) async fn put_file(
    store: &dyn ObjectStore,
    location: &ObjectPath,
    source: &Path,
    attributes: Attributes,
    options: &TransferOptions,
) -> Result<u64> {
    let mut file = match File::open(source).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    let total = file.metadata().await?.len();

    options.report(TransferStatus::Starting, 0, Some(total));
    if options.is_cancelled() {
        options.report(TransferStatus::Failed, 0, Some(total));
        return Err(Error::Cancelled);
    }

    let mut sent = 0;
    let result = if total <= options.chunk_size() as u64 {
        put_single(store, location, &mut file, attributes, &mut sent).await
    } else {
        put_multipart(store, location, &mut file, attributes, total, options, &mut sent).await
    };

    match result {
        Ok(()) => {
            options.report(TransferStatus::Completed, sent, Some(total));
            Ok(sent)
        }
        Err(err) => {
            options.report(TransferStatus::Failed, sent, Some(total));
            Err(err)
        }
    }
}

async fn put_single(
    store: &dyn ObjectStore,
    location: &ObjectPath,
    file: &mut File,
    attributes: Attributes,
    sent: &mut u64,
) -> Result<()> {
    let mut data = Vec::new();
    file.read_to_end(&mut data).await?;
    let len = data.len() as u64;

    let opts = PutOptions {
        attributes,
        ..Default::default()
    };
    store
        .put_opts(location, PutPayload::from(Bytes::from(data)), opts)
        .await
        .map_err(|e| from_object_store("upload", e))?;

    *sent = len;
    Ok(())
}

async fn put_multipart(
    store: &dyn ObjectStore,
    location: &ObjectPath,
    file: &mut File,
    attributes: Attributes,
    total: u64,
    options: &TransferOptions,
    sent: &mut u64,
) -> Result<()> {
    let opts = PutMultipartOptions {
        attributes,
        ..Default::default()
    };
    let upload = store
        .put_multipart_opts(location, opts)
        .await
        .map_err(|e| from_object_store("upload", e))?;
    let mut writer = WriteMultipart::new_with_chunk_size(upload, options.chunk_size());

    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        if options.is_cancelled() {
            abort(writer, location).await;
            return Err(Error::Cancelled);
        }

        let read = match file.read(&mut buffer).await {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) => {
                abort(writer, location).await;
                return Err(e.into());
            }
        };

        if let Err(e) = writer.wait_for_capacity(MAX_CONCURRENT_PARTS).await {
            abort(writer, location).await;
            return Err(from_object_store("upload", e));
        }

        writer.write(&buffer[..read]);
        *sent += read as u64;
        options.report(TransferStatus::InProgress, *sent, Some(total));
    }

    writer
        .finish()
        .await
        .map_err(|e| from_object_store("upload", e))?;

    Ok(())
}

async fn abort(writer: WriteMultipart, location: &ObjectPath) {
    if let Err(e) = writer.abort().await {
        tracing::warn!(
            target: TRACING_TARGET_TRANSFER,
            location = %location,
            error = %e,
            "Failed to abort multipart upload"
        );
    }
}
