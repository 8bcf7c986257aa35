//! Bounded byte transfer from a seekable source to a sink.
//!
//! The delivery engine behind full and partial downloads: it moves
//! either the whole stream or an inclusive byte window through a
//! fixed-size buffer, accounting for every byte written.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

use crate::http::range::ByteRange;

/// Transfer buffer size (8 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Copy `source` into `sink`, bounded by `range` when present.
///
/// Without a range the whole stream is copied from offset 0 until end
/// of stream. With a range, the source is seeked to `range.start` and
/// exactly `range.len()` bytes are written: a read that overshoots
/// the window tail is truncated to the bytes still owed, and an end
/// of stream before the window is exhausted is an error
/// ([`io::ErrorKind::UnexpectedEof`]), never a silent short body.
///
/// Returns the number of bytes written, which on success equals the
/// planned content length. The source is owned and dropped on every
/// exit path.
pub async fn copy_range<R, W>(
    mut source: R,
    mut sink: W,
    range: Option<ByteRange>,
    buf_size: usize,
) -> io::Result<u64>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut written: u64 = 0;

    let Some(range) = range else {
        loop {
            let n = source.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n]).await?;
            written += n as u64;
        }
        sink.flush().await?;
        return Ok(written);
    };

    source.seek(io::SeekFrom::Start(range.start)).await?;

    let mut remaining = range.len();
    while remaining > 0 {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended with {remaining} bytes still expected"),
            ));
        }
        // Never write past the window tail, even when the read
        // returned more than is still owed.
        #[allow(clippy::cast_possible_truncation)]
        let take = remaining.min(n as u64) as usize;
        sink.write_all(&buf[..take]).await?;
        written += take as u64;
        remaining -= take as u64;
    }
    sink.flush().await?;

    Ok(written)
}
