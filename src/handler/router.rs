//! Request routing dispatch.
//!
//! Entry point for request processing: method validation, the
//! `/file` route, health probes, and access logging.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use hyper::{Method, Request, Response};

use crate::config::ServerContext;
use crate::handler::{files, listing, resolver};
use crate::http::body::Body;
use crate::http::response;
use crate::logger::{self, AccessLogEntry};

/// Fixed route prefix all file operations live under. The suffix
/// after it is the path relative to the served root.
pub const FILE_ROUTE_PREFIX: &str = "/file";

/// Per-request view of the pieces the handlers need.
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    ctx: Arc<ServerContext>,
    remote_addr: std::net::SocketAddr,
) -> Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let rctx = RequestContext {
        path: uri.path(),
        is_head: method == Method::HEAD,
        range_header: req
            .headers()
            .get("range")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };

    let res = match check_http_method(&method) {
        Some(early) => early,
        None => route_request(&rctx, &ctx).await,
    };

    if ctx.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.status = res.status().as_u16();
        entry.body_bytes = content_length_of(&res);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &ctx.config.logging.access_log_format);
    }

    Ok(res)
}

/// GET and HEAD pass through; OPTIONS is answered directly; anything
/// else is a 405.
fn check_http_method(method: &Method) -> Option<Response<Body>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(response::options()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(response::method_not_allowed())
        }
    }
}

async fn route_request(rctx: &RequestContext<'_>, ctx: &Arc<ServerContext>) -> Response<Body> {
    match rctx.path {
        "/healthz" | "/readyz" => response::health("ok"),
        // The server has exactly one surface; the bare root points
        // the client at it.
        "/" => response::moved_permanently(&format!("{FILE_ROUTE_PREFIX}/")),
        path if path == FILE_ROUTE_PREFIX || path.starts_with("/file/") => {
            serve_under_root(rctx, ctx).await
        }
        _ => response::not_found(),
    }
}

/// Serve the entry the suffix after `/file` resolves to: a listing
/// (or slash redirect) for directories, a planned transfer for files.
async fn serve_under_root(rctx: &RequestContext<'_>, ctx: &Arc<ServerContext>) -> Response<Body> {
    let suffix = &rctx.path[FILE_ROUTE_PREFIX.len()..];

    let Some(entry) = resolver::resolve(&ctx.root, suffix).await else {
        return response::not_found();
    };

    if entry.is_dir {
        // Directory URLs carry a trailing slash so relative listing
        // links resolve against them.
        if !rctx.path.ends_with('/') {
            return response::moved_permanently(&format!("{}/", rctx.path));
        }
        let at_root = entry.path == ctx.root;
        return match listing::render(&entry.path, rctx.path, at_root).await {
            Ok(html) => response::html_page(html, rctx.is_head),
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to list '{}': {e}",
                    entry.path.display()
                ));
                response::not_found()
            }
        };
    }

    let plan = files::plan_transfer(
        &entry,
        rctx.range_header.as_deref(),
        ctx.config.files.inline_display,
    );
    files::serve_entry(&entry, plan, rctx.is_head).await
}

fn content_length_of(res: &Response<Body>) -> u64 {
    res.headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
