//! Path utilities for detecting container files by extension.

use std::path::Path;

/// Container extensions indexed when no explicit list is configured.
pub const DEFAULT_CONTAINER_EXTENSIONS: &[&str] = &["mkv"];

/// Check if a path has one of the given extensions (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use duckflix_common::paths::has_extension;
///
/// assert!(has_extension(Path::new("/movies/Alien.MKV"), &["mkv"]));
/// assert!(!has_extension(Path::new("/movies/cover.jpg"), &["mkv"]));
/// ```
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Guess the MIME type of a served file from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mkv") => "video/x-matroska",
        Some("mka") => "audio/x-matroska",
        Some("webm") => "video/webm",
        Some("mp4") | Some("m4v") => "video/mp4",
        _ => "application/octet-stream",
    }
}
