//! Hand-off of encoded messages to an async transport.
//!
//! The encoder never owns a connection. These helpers write a scatter/gather
//! sequence to any `AsyncWrite` the transport layer provides, using vectored
//! writes so header, body sections and values go out without being copied
//! into one contiguous buffer.
//!
//! # Architecture
//!
//! ```text
//! Statement ─► Arc<Request> ─► RequestMessage::encode ─► BufferVec ─► write_bufs ─► AsyncWrite
//! ```

use std::io::IoSlice;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::buffer::BufferVec;
use crate::config::EncoderConfig;
use crate::error::{CqlError, Result};
use crate::protocol::RequestMessage;

/// Encode `message` with the configured version and flags, then write it.
///
/// Returns the number of bytes written.
pub async fn write_message<W>(
    writer: &mut W,
    message: &mut RequestMessage,
    config: &EncoderConfig,
    stream: i16,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut bufs = BufferVec::new();
    message.encode(config.protocol_version, config.header_flags, stream, &mut bufs)?;
    write_bufs(writer, &bufs).await?;
    Ok(bufs.total_len())
}

/// Write every range of `bufs` in order using scatter/gather I/O.
///
/// Continues after partial writes and flushes once everything is written.
pub async fn write_bufs<W>(writer: &mut W, bufs: &BufferVec) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let total_size = bufs.total_len();
    if total_size == 0 {
        return Ok(());
    }

    let mut total_written = 0;
    while total_written < total_size {
        let slices = build_remaining_slices(bufs, total_written);
        if slices.is_empty() {
            break;
        }

        let written = writer.write_vectored(&slices).await?;
        if written == 0 {
            return Err(CqlError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_vectored returned 0",
            )));
        }

        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// Build IoSlice array for remaining data after `skip_bytes` were written.
fn build_remaining_slices(bufs: &BufferVec, skip_bytes: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(bufs.len());
    let mut skipped = 0;

    for buf in bufs {
        let start = skipped;
        let end = skipped + buf.len();

        if !buf.is_empty() && skip_bytes < end {
            let start_in_buf = skip_bytes.saturating_sub(start);
            slices.push(IoSlice::new(&buf[start_in_buf..]));
        }
        skipped = end;
    }

    slices
}
