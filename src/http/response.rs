//! HTTP status response builders.
//!
//! Small builders for the non-transfer responses. Each falls back to
//! a bare response if header assembly fails, so a handler never
//! panics while answering a request.

use hyper::Response;

use crate::http::body::{self, Body};
use crate::logger;

/// 404 Not Found with a plain-text body.
pub fn not_found() -> Response<Body> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(body::full("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(body::full("404 Not Found"))
        })
}

/// 405 Method Not Allowed.
pub fn method_not_allowed() -> Response<Body> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(body::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(body::full("405 Method Not Allowed"))
        })
}

/// 204 answer to an OPTIONS preflight.
pub fn options() -> Response<Body> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(body::empty())
        })
}

/// 416 Range Not Satisfiable, with the total length the client should
/// retry against.
pub fn range_not_satisfiable(total_len: u64) -> Response<Body> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{total_len}"))
        .body(body::full("Range Not Satisfiable"))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(body::full("Range Not Satisfiable"))
        })
}

/// 301 redirect, used to give directory URLs their trailing slash.
pub fn moved_permanently(location: &str) -> Response<Body> {
    Response::builder()
        .status(301)
        .header("Location", location)
        .header("Content-Type", "text/plain")
        .body(body::full("Moved Permanently"))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(body::empty())
        })
}

/// 200 plain-text health probe answer.
pub fn health(status: &'static str) -> Response<Body> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Content-Length", status.len())
        .body(body::full(status))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(body::full(status))
        })
}

/// 200 HTML page (directory listings).
pub fn html_page(content: String, is_head: bool) -> Response<Body> {
    let content_length = content.len();
    let payload = if is_head { body::empty() } else { body::full(content) };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=UTF-8")
        .header("Content-Length", content_length)
        .body(payload)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(body::empty())
        })
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
