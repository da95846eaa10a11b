//! Extension-based mime type resolution.
//! 以副檔名推斷 mime 類型。

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

/// Fallback for unrecognized extensions.
pub const DEFAULT_MIME: &str = "text/plain";

/// Mime type assigned to freshly created untitled notes.
pub const MARKDOWN_MIME: &str = "text/markdown";

static MIME_BY_EXTENSION: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("md", MARKDOWN_MIME),
        ("markdown", MARKDOWN_MIME),
        ("txt", DEFAULT_MIME),
        ("rs", "text/x-rust"),
        ("toml", "text/x-toml"),
        ("json", "application/json"),
        ("yaml", "text/x-yaml"),
        ("yml", "text/x-yaml"),
        ("html", "text/html"),
        ("css", "text/css"),
        ("js", "text/javascript"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("svg", "image/svg+xml"),
    ]
    .into_iter()
    .collect()
});

/// Resolves a path's mime type from its extension.
/// 由路徑的副檔名推斷 mime 類型；無法辨識時回傳 `text/plain`。
pub fn for_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MIME_BY_EXTENSION.get(ext.as_str()).copied())
        .unwrap_or(DEFAULT_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_resolve() {
        assert_eq!(for_path("notes/todo.md"), "text/markdown");
        assert_eq!(for_path("src/lib.RS"), "text/x-rust");
        assert_eq!(for_path("logo.svg"), "image/svg+xml");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back() {
        assert_eq!(for_path("Makefile"), DEFAULT_MIME);
        assert_eq!(for_path("weird.xyz123"), DEFAULT_MIME);
    }
}
