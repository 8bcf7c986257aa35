//! Response body plumbing.
//!
//! Every handler branch produces the same boxed body type, whether
//! the payload is an in-memory buffer or a streamed byte window of a
//! file.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use tokio::fs::File;
use tokio_stream::StreamExt;
use tokio_util::io::ReaderStream;

use crate::http::range::ByteRange;
use crate::http::transfer::{self, DEFAULT_BUFFER_SIZE};
use crate::logger;

/// Body type shared by every response branch.
pub type Body = BoxBody<Bytes, std::io::Error>;

/// Zero-length body (404 fallbacks, HEAD responses).
pub fn empty() -> Body {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// Body over an in-memory buffer.
pub fn full(data: impl Into<Bytes>) -> Body {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

/// Stream a byte window of `file` as a response body.
///
/// A copier task owns the file handle and pushes the window through
/// one half of a duplex pipe; the body streams from the other half.
/// The handle is dropped on every exit path of the task. A source
/// that ends before the window is exhausted aborts the body
/// mid-stream, so the client sees a broken transfer rather than a
/// silently short one. A client that goes away surfaces as a broken
/// pipe on the copier's side and is not treated as a server error.
pub fn file_body(file: File, range: Option<ByteRange>, name: String) -> Body {
    let (writer, reader) = tokio::io::duplex(DEFAULT_BUFFER_SIZE);

    tokio::spawn(async move {
        match transfer::copy_range(file, writer, range, DEFAULT_BUFFER_SIZE).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                // Client disconnected mid-transfer; normal abort.
            }
            Err(e) => logger::log_error(&format!("Transfer of '{name}' failed: {e}")),
        }
    });

    let frames = ReaderStream::new(reader).map(|chunk| chunk.map(Frame::data));
    StreamBody::new(frames).boxed()
}
