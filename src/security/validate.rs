//! Input validation and sanitization.
//!
//! The denylist here is a heuristic, not a security guarantee: descriptions
//! are HTML-escaped before storage, and escaping is what actually prevents
//! markup from reaching the page. The denylist rejects the obvious attempts
//! early so they never enter the store at all.

use std::net::{IpAddr, SocketAddr};
use std::sync::LazyLock;

use axum::http::HeaderMap;
use regex::Regex;

/// Largest task id accepted from a request path.
pub const MAX_TASK_ID: i64 = 999_999;

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Control characters that never belong in a description: C0 controls
/// except tab/newline/carriage-return, plus DEL.
static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("static pattern"));

/// Script-like markup patterns rejected outright, case-insensitively.
static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)<script[^>]*?>.*?</script>",
        r"(?i)<iframe[^>]*?>.*?</iframe>",
        r"(?i)<object[^>]*?>.*?</object>",
        r"(?i)<embed[^>]*?>.*?</embed>",
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)data:text/html",
        r"(?i)on\w+\s*=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Check a task description: trimmed length in [1, 500] chars, no control
/// characters, nothing matching the denylist.
pub fn validate_description(description: &str) -> bool {
    if description.trim().is_empty() || description.chars().count() > MAX_DESCRIPTION_CHARS {
        return false;
    }

    if CONTROL_CHARS.is_match(description) {
        return false;
    }

    !DANGEROUS_PATTERNS.iter().any(|p| p.is_match(description))
}

/// Strip control characters, trim, HTML-escape, and cap at 500 chars.
/// Side-effect free.
pub fn sanitize_description(description: &str) -> String {
    let stripped = CONTROL_CHARS.replace_all(description, "");
    let escaped = html_escape(stripped.trim());
    escaped.chars().take(MAX_DESCRIPTION_CHARS).collect()
}

/// Check a task id: integer in [1, 999999].
pub fn validate_task_id(id: i64) -> bool {
    (1..=MAX_TASK_ID).contains(&id)
}

/// Check a filter value against the known set.
pub fn validate_filter_type(filter: &str) -> bool {
    matches!(filter, "all" | "active" | "completed")
}

/// Escape HTML-significant characters.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Resolve the client address used as the rate-limit key.
///
/// The first `X-Forwarded-For` / `X-Real-IP` entry wins when it parses as
/// an IP address; anything else falls back to the peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    for header in ["x-forwarded-for", "x-real-ip"] {
        let Some(value) = headers.get(header).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        let first = value.split(',').next().unwrap_or("").trim();
        if first.parse::<IpAddr>().is_ok() {
            return first.to_string();
        }
    }
    peer.ip().to_string()
}
