//! Helpers for sanitizing recognized text before it enters tracing span
//! attributes or log lines.
//!
//! Recognized notes can contain personal content; these functions make
//! sure only short, truncated fragments ever end up in shared traces.

/// Maximum characters of recognized text included in a log line.
const SNIPPET_LEN: usize = 48;

/// Returns a log-safe fragment of recognized text: first line only,
/// truncated to a fixed length with an ellipsis.
pub fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let mut out: String = first_line.chars().take(SNIPPET_LEN).collect();
    if first_line.chars().count() > SNIPPET_LEN || text.lines().count() > 1 {
        out.push('…');
    }
    out
}

/// Returns only the filename component of a path-like string.
pub fn redact_filename(name: &str) -> String {
    std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}
