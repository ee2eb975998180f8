//! Module `file_ops`
//!
//! Moves file bytes across a data connection in bounded chunks. Each chunk
//! is written with `write_all`, so the sender is paced by the receiver.

use log::{debug, info};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransferError;

/// Copies `reader` to `writer` until EOF, `buffer_size` bytes at a time.
///
/// Returns the number of bytes copied. The writer is flushed but not closed.
pub async fn copy_chunks<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n]).await?;
        total += n as u64;
    }

    writer.flush().await?;
    Ok(total)
}

/// Streams an open file to the data connection and closes the connection.
pub async fn send_file<W>(
    file: &mut File,
    data: &mut W,
    buffer_size: usize,
) -> Result<u64, TransferError>
where
    W: AsyncWrite + Unpin,
{
    let sent = copy_chunks(file, data, buffer_size).await?;
    data.shutdown().await?;
    debug!("Sent {} bytes on data channel", sent);
    Ok(sent)
}

/// Drains the data connection into a newly created file at `destination`.
pub async fn receive_file<R>(
    data: &mut R,
    destination: &mut File,
    buffer_size: usize,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin,
{
    let received = copy_chunks(data, destination, buffer_size).await?;
    destination.sync_all().await?;
    debug!("Received {} bytes on data channel", received);
    Ok(received)
}

/// Opens `path` for sending and reports its size, or `None` if it is not a
/// readable regular file.
pub async fn open_for_transfer(path: &Path) -> Option<(File, u64)> {
    let file = File::open(path).await.ok()?;
    let metadata = file.metadata().await.ok()?;
    if !metadata.is_file() {
        return None;
    }
    info!("Opened {} ({} bytes) for transfer", path.display(), metadata.len());
    Some((file, metadata.len()))
}

/// Fails unless the transferred byte count equals the declared size.
pub fn check_size(declared: u64, actual: u64) -> Result<(), TransferError> {
    if declared == actual {
        Ok(())
    } else {
        Err(TransferError::SizeMismatch { declared, actual })
    }
}
