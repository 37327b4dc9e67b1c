//! Fenced code extraction.

use regex::Regex;
use std::sync::LazyLock;

/// First fenced block: optional info string, newline, body up to the closing fence.
static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[^\n`]*\n(.*?)```").expect("FENCE_REGEX must compile")
});

/// Extract the body of the first fenced code block in `text`.
///
/// Falls back to the trimmed input when no fenced block is found. This is
/// lenient: a prose-only response passes through as if it were code.
pub fn extract_code(text: &str) -> String {
    match FENCE_REGEX.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim_end().to_string(),
        None => {
            tracing::debug!("No fenced code block found; keeping raw response");
            text.trim().to_string()
        }
    }
}
