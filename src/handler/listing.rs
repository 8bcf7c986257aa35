//! Directory listing HTML generation.

use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::fs;

/// Bytes escaped when a file name becomes an href segment.
const HREF_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`');

struct ListedEntry {
    name: String,
    is_dir: bool,
}

/// Render the listing page for `dir`.
///
/// One link per entry, relative to the request URL (which ends with
/// `/`): directories first, suffixed with `/`, then files, both
/// sorted case-insensitively. Labels are HTML-escaped and hrefs
/// percent-encoded. A parent link is emitted except at the served
/// root.
pub async fn render(dir: &Path, url_path: &str, at_root: bool) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push(ListedEntry { name, is_dir });
    }
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let mut items = String::new();
    if !at_root {
        items.push_str("        <li><a href=\"../\">../</a></li>\n");
    }
    for entry in &entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let href = format!("{}{suffix}", utf8_percent_encode(&entry.name, HREF_SET));
        let label = format!("{}{suffix}", escape_html(&entry.name));
        items.push_str(&format!("        <li><a href=\"{href}\">{label}</a></li>\n"));
    }

    let title = escape_html(url_path);
    Ok(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>Index of {title}</title>\n\
         </head>\n\
         <body>\n\
             <h1>Index of {title}</h1>\n\
             <hr>\n\
             <ul>\n\
         {items}\
             </ul>\n\
             <hr>\n\
         </body>\n\
         </html>\n"
    ))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn directories_come_first_with_trailing_slash() {
        let dir = TempDir::new().unwrap();
        std_fs::write(dir.path().join("b.txt"), b"x").unwrap();
        std_fs::write(dir.path().join("Alpha.txt"), b"x").unwrap();
        std_fs::create_dir(dir.path().join("zeta")).unwrap();

        let html = render(dir.path(), "/file/", true).await.unwrap();
        let zeta = html.find("zeta/").unwrap();
        let alpha = html.find("Alpha.txt").unwrap();
        let b = html.find("b.txt").unwrap();
        assert!(zeta < alpha, "directory should sort before files");
        assert!(alpha < b, "file sort should ignore case");
        assert!(html.contains("<a href=\"zeta/\">zeta/</a>"));
    }

    #[tokio::test]
    async fn parent_link_only_below_the_root() {
        let dir = TempDir::new().unwrap();
        let at_root = render(dir.path(), "/file/", true).await.unwrap();
        assert!(!at_root.contains("href=\"../\""));

        let below = render(dir.path(), "/file/sub/", false).await.unwrap();
        assert!(below.contains("<a href=\"../\">../</a>"));
    }

    #[tokio::test]
    async fn names_are_escaped_and_hrefs_encoded() {
        let dir = TempDir::new().unwrap();
        std_fs::write(dir.path().join("a<b>&\"c.txt"), b"x").unwrap();
        std_fs::write(dir.path().join("has space.txt"), b"x").unwrap();

        let html = render(dir.path(), "/file/", true).await.unwrap();
        assert!(html.contains("a&lt;b&gt;&amp;&quot;c.txt"));
        assert!(html.contains("href=\"has%20space.txt\""));
        assert!(!html.contains("<b>&\"c.txt"));
    }

    #[tokio::test]
    async fn heading_names_the_request_path() {
        let dir = TempDir::new().unwrap();
        let html = render(dir.path(), "/file/music/", false).await.unwrap();
        assert!(html.contains("<title>Index of /file/music/</title>"));
        assert!(html.contains("<h1>Index of /file/music/</h1>"));
    }
}
