//! URL path to filesystem resolution.
//!
//! Maps the suffix after the route prefix onto an entry under the
//! served root and snapshots its metadata for the current request.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use tokio::fs;

use crate::logger;

/// Read-only snapshot of a filesystem entry, taken at request time
/// and never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Canonical filesystem location.
    pub path: PathBuf,
    /// Final path component, used for `Content-Disposition`.
    pub name: String,
    /// Size in bytes (0 for directories).
    pub size: u64,
    pub is_dir: bool,
}

/// Resolve a URL suffix against the canonicalized served root.
///
/// Returns `None` for everything that must answer 404: undecodable
/// paths, missing entries, unreadable entries, and paths that escape
/// the root. Escapes are detected after canonicalization, so `..`
/// segments and symlinks pointing outside the tree are both caught,
/// and they are indistinguishable from a missing file on the wire.
pub async fn resolve(root: &Path, url_suffix: &str) -> Option<FileEntry> {
    let decoded = percent_decode_str(url_suffix).decode_utf8().ok()?;
    let relative = decoded.trim_start_matches('/');

    let canonical = fs::canonicalize(root.join(relative)).await.ok()?;
    if !canonical.starts_with(root) {
        logger::log_warning(&format!("Refused path escaping served root: {decoded}"));
        return None;
    }

    let meta = fs::metadata(&canonical).await.ok()?;
    let name = canonical
        .file_name()
        .map_or_else(|| String::from("/"), |n| n.to_string_lossy().into_owned());

    Some(FileEntry {
        path: canonical,
        name,
        size: meta.len(),
        is_dir: meta.is_dir(),
    })
}
