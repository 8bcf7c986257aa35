//! File transfer planning and execution.
//!
//! Planning is a pure computation over the entry snapshot and the
//! Range header; no bytes are read until the plan is executed.

use hyper::{Response, StatusCode};
use tokio::fs::File;

use crate::handler::resolver::FileEntry;
use crate::http::body::{self, Body};
use crate::http::mime;
use crate::http::range::{parse_range, ByteRange};
use crate::http::response;
use crate::logger;

/// How the client is told to present the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Render in the browser (images and video, when enabled).
    Inline,
    /// Prompt a download.
    Attachment,
}

impl Disposition {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// Response metadata for one file transfer.
///
/// Invariant: `content_len == range.len()` when a range is present,
/// else `content_len == total_len`; a 416 plan carries no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub status: StatusCode,
    pub range: Option<ByteRange>,
    pub total_len: u64,
    pub content_len: u64,
    pub content_type: &'static str,
    pub disposition: Disposition,
    pub file_name: String,
}

/// Decide status, byte window, and headers for a regular file.
///
/// Malformed and unsatisfiable ranges both answer 416: neither may
/// ever corrupt the length accounting or crash the request.
pub fn plan_transfer(
    entry: &FileEntry,
    range_header: Option<&str>,
    inline_display: bool,
) -> TransferPlan {
    let content_type = mime::content_type_for(extension_of(&entry.name));
    let disposition = if inline_display && mime::is_inline_category(content_type) {
        Disposition::Inline
    } else {
        Disposition::Attachment
    };

    let full = TransferPlan {
        status: StatusCode::OK,
        range: None,
        total_len: entry.size,
        content_len: entry.size,
        content_type,
        disposition,
        file_name: entry.name.clone(),
    };

    let Some(header) = range_header else {
        return full;
    };

    match parse_range(header, entry.size) {
        Ok(range) => TransferPlan {
            status: StatusCode::PARTIAL_CONTENT,
            content_len: range.len(),
            range: Some(range),
            ..full
        },
        Err(err) => {
            logger::log_warning(&format!(
                "Rejected Range '{header}' for '{}': {err}",
                entry.name
            ));
            TransferPlan {
                status: StatusCode::RANGE_NOT_SATISFIABLE,
                content_len: 0,
                ..full
            }
        }
    }
}

/// Execute a plan against the resolved file.
///
/// HEAD requests answer with the plan's headers and no body, without
/// opening the file.
pub async fn serve_entry(entry: &FileEntry, plan: TransferPlan, is_head: bool) -> Response<Body> {
    if plan.status == StatusCode::RANGE_NOT_SATISFIABLE {
        return response::range_not_satisfiable(plan.total_len);
    }

    let payload = if is_head {
        body::empty()
    } else {
        match File::open(&entry.path).await {
            Ok(file) => body::file_body(file, plan.range, entry.name.clone()),
            Err(e) => {
                logger::log_error(&format!("Failed to open '{}': {e}", entry.path.display()));
                return response::not_found();
            }
        }
    };

    build_transfer_response(&plan, payload)
}

fn build_transfer_response(plan: &TransferPlan, payload: Body) -> Response<Body> {
    let mut builder = Response::builder()
        .status(plan.status)
        .header("Content-Type", plan.content_type)
        .header("Content-Length", plan.content_len)
        .header("Accept-Ranges", "bytes")
        .header(
            "Content-Disposition",
            format!(
                "{}; filename=\"{}\"",
                plan.disposition.as_str(),
                sanitize_filename(&plan.file_name)
            ),
        );

    if let Some(range) = plan.range {
        builder = builder.header(
            "Content-Range",
            format!("bytes {}-{}/{}", range.start, range.end, plan.total_len),
        );
    }

    builder.body(payload).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build transfer response: {e}"));
        Response::new(body::empty())
    })
}

fn extension_of(name: &str) -> Option<&str> {
    std::path::Path::new(name).extension().and_then(|e| e.to_str())
}

/// Keep the quoted filename parameter parseable whatever the file is
/// called on disk.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entry_named(name: &str, size: u64) -> FileEntry {
        FileEntry {
            path: PathBuf::from(format!("/tmp/{name}")),
            name: name.to_string(),
            size,
            is_dir: false,
        }
    }

    async fn collect(body: Body) -> Bytes {
        body.collect().await.unwrap().to_bytes()
    }

    #[test]
    fn no_range_header_plans_a_full_transfer() {
        let plan = plan_transfer(&entry_named("report.pdf", 1234), None, true);
        assert_eq!(plan.status, StatusCode::OK);
        assert_eq!(plan.range, None);
        assert_eq!(plan.content_len, 1234);
        assert_eq!(plan.total_len, 1234);
        assert_eq!(plan.content_type, "application/pdf");
    }

    #[test]
    fn bounded_range_plans_partial_content() {
        let plan = plan_transfer(&entry_named("a.bin", 1234), Some("bytes=0-499"), false);
        assert_eq!(plan.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(plan.range, Some(ByteRange { start: 0, end: 499 }));
        assert_eq!(plan.content_len, 500);
    }

    #[test]
    fn open_range_runs_to_the_last_byte() {
        let plan = plan_transfer(&entry_named("a.bin", 1234), Some("bytes=1000-"), false);
        assert_eq!(plan.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(plan.range, Some(ByteRange { start: 1000, end: 1233 }));
        assert_eq!(plan.content_len, 234);
    }

    #[test]
    fn out_of_bounds_range_plans_416_with_zero_length() {
        let plan = plan_transfer(&entry_named("a.bin", 1234), Some("bytes=2000-2100"), false);
        assert_eq!(plan.status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(plan.content_len, 0);
        assert_eq!(plan.range, None);
    }

    #[test]
    fn malformed_range_plans_416_as_well() {
        for header in ["bytes=-500", "bytes=a-b", "elephants=0-4"] {
            let plan = plan_transfer(&entry_named("a.bin", 1234), Some(header), false);
            assert_eq!(plan.status, StatusCode::RANGE_NOT_SATISFIABLE, "{header}");
            assert_eq!(plan.content_len, 0, "{header}");
        }
    }

    #[test]
    fn disposition_follows_category_and_config() {
        let image = entry_named("cat.png", 10);
        let video = entry_named("cat.mp4", 10);
        let text = entry_named("cat.txt", 10);

        assert_eq!(plan_transfer(&image, None, true).disposition, Disposition::Inline);
        assert_eq!(plan_transfer(&video, None, true).disposition, Disposition::Inline);
        assert_eq!(plan_transfer(&text, None, true).disposition, Disposition::Attachment);
        // Inline display switched off downgrades everything.
        assert_eq!(plan_transfer(&image, None, false).disposition, Disposition::Attachment);
        assert_eq!(plan_transfer(&video, None, false).disposition, Disposition::Attachment);
    }

    #[test]
    fn unknown_extension_defaults_to_octet_stream() {
        let plan = plan_transfer(&entry_named("blob", 10), None, true);
        assert_eq!(plan.content_type, "application/octet-stream");
        assert_eq!(plan.disposition, Disposition::Attachment);
    }

    #[test]
    fn filename_quotes_are_sanitized() {
        assert_eq!(sanitize_filename("a\"b.txt"), "a_b.txt");
        assert_eq!(sanitize_filename("plain.txt"), "plain.txt");
    }

    /// Write a real file and return its resolver-style snapshot.
    fn on_disk(dir: &TempDir, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        FileEntry {
            path,
            name: name.to_string(),
            size: content.len() as u64,
            is_dir: false,
        }
    }

    #[tokio::test]
    async fn serves_a_full_file_with_headers() {
        let dir = TempDir::new().unwrap();
        let entry = on_disk(&dir, "hello.txt", b"hello world");
        let plan = plan_transfer(&entry, None, true);

        let res = serve_entry(&entry, plan, false).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("Content-Length").unwrap(), "11");
        assert_eq!(res.headers().get("Accept-Ranges").unwrap(), "bytes");
        assert_eq!(
            res.headers().get("Content-Disposition").unwrap(),
            "attachment; filename=\"hello.txt\""
        );
        assert!(res.headers().get("Content-Range").is_none());
        assert_eq!(collect(res.into_body()).await, &b"hello world"[..]);
    }

    #[tokio::test]
    async fn serves_a_byte_window_with_content_range() {
        let dir = TempDir::new().unwrap();
        let entry = on_disk(&dir, "digits.txt", b"0123456789abcdef");
        let plan = plan_transfer(&entry, Some("bytes=2-5"), true);

        let res = serve_entry(&entry, plan, false).await;
        assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(res.headers().get("Content-Range").unwrap(), "bytes 2-5/16");
        assert_eq!(res.headers().get("Content-Length").unwrap(), "4");
        assert_eq!(collect(res.into_body()).await, &b"2345"[..]);
    }

    #[tokio::test]
    async fn single_byte_window_at_offset_zero() {
        let dir = TempDir::new().unwrap();
        let entry = on_disk(&dir, "digits.txt", b"0123456789");
        let plan = plan_transfer(&entry, Some("bytes=0-0"), true);

        let res = serve_entry(&entry, plan, false).await;
        assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(res.headers().get("Content-Range").unwrap(), "bytes 0-0/10");
        assert_eq!(collect(res.into_body()).await, &b"0"[..]);
    }

    #[tokio::test]
    async fn same_window_twice_yields_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let entry = on_disk(&dir, "digits.txt", b"0123456789abcdef");

        let first = serve_entry(&entry, plan_transfer(&entry, Some("bytes=4-11"), true), false).await;
        let second = serve_entry(&entry, plan_transfer(&entry, Some("bytes=4-11"), true), false).await;
        assert_eq!(
            collect(first.into_body()).await,
            collect(second.into_body()).await
        );
    }

    #[tokio::test]
    async fn adjacent_windows_reassemble_the_file() {
        let dir = TempDir::new().unwrap();
        let content = b"the quick brown fox jumps over the lazy dog";
        let entry = on_disk(&dir, "fox.txt", content);
        let split = 20;

        let head = serve_entry(
            &entry,
            plan_transfer(&entry, Some(&format!("bytes=0-{split}")), true),
            false,
        )
        .await;
        let tail = serve_entry(
            &entry,
            plan_transfer(&entry, Some(&format!("bytes={}-", split + 1)), true),
            false,
        )
        .await;

        let mut all = collect(head.into_body()).await.to_vec();
        all.extend_from_slice(&collect(tail.into_body()).await);
        assert_eq!(all, content);
    }

    #[tokio::test]
    async fn head_request_sends_headers_only() {
        let dir = TempDir::new().unwrap();
        let entry = on_disk(&dir, "hello.txt", b"hello world");
        let plan = plan_transfer(&entry, None, true);

        let res = serve_entry(&entry, plan, true).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("Content-Length").unwrap(), "11");
        assert!(collect(res.into_body()).await.is_empty());
    }

    #[tokio::test]
    async fn unsatisfiable_range_serves_416() {
        let dir = TempDir::new().unwrap();
        let entry = on_disk(&dir, "small.bin", &[0u8; 100]);
        let plan = plan_transfer(&entry, Some("bytes=500-"), true);

        let res = serve_entry(&entry, plan, false).await;
        assert_eq!(res.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(res.headers().get("Content-Range").unwrap(), "bytes */100");
    }

    #[tokio::test]
    async fn vanished_file_answers_404() {
        let dir = TempDir::new().unwrap();
        let mut entry = on_disk(&dir, "gone.txt", b"x");
        entry.path = dir.path().join("never-existed.txt");
        let plan = plan_transfer(&entry, None, true);

        let res = serve_entry(&entry, plan, false).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_file_full_transfer_has_zero_length() {
        let dir = TempDir::new().unwrap();
        let entry = on_disk(&dir, "empty.txt", b"");
        let plan = plan_transfer(&entry, None, true);

        let res = serve_entry(&entry, plan, false).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("Content-Length").unwrap(), "0");
        assert!(collect(res.into_body()).await.is_empty());
    }
}
