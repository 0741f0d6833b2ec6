//! MIME type detection based on file extensions.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Returned for unknown or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension (with leading dot) to content type. Built once, read-only.
static MIME_TABLE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (".html", "text/html"),
        (".htm", "text/html"),
        (".css", "text/css"),
        (".js", "application/javascript"),
        (".json", "application/json"),
        (".map", "application/json"),
        (".png", "image/png"),
        (".jpg", "image/jpeg"),
        (".jpeg", "image/jpeg"),
        (".gif", "image/gif"),
        (".ico", "image/x-icon"),
        (".svg", "image/svg+xml"),
        (".txt", "text/plain"),
        (".wasm", "application/wasm"),
        (".woff2", "font/woff2"),
    ])
});

/// Resolves the content type for `path` from the text after its last `.`.
///
/// Matching is case-sensitive: `.PNG` is not `.png`.
///
/// ```
/// # use docroot::http::mime::resolve;
/// assert_eq!(resolve("public/app.js"), "application/javascript");
/// assert_eq!(resolve("public/LICENSE"), "application/octet-stream");
/// ```
pub fn resolve(path: &str) -> &'static str {
    path.rfind('.')
        .and_then(|dot| MIME_TABLE.get(&path[dot..]))
        .copied()
        .unwrap_or(OCTET_STREAM)
}
