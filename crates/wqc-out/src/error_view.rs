//! Error state shown in place of a presentation when a cycle aborts.

use serde::Serialize;
use wqc_core::ConsoleError;

/// Advisory hints for a bare HTTP failure. Not derived from any diagnosis.
pub const GENERIC_HTTP_HINTS: [&str; 3] = [
    "Check that the field names in the query exist in the index mapping",
    "Try a narrower time window",
    "Verify the backend credentials are valid",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub title: String,
    pub message: String,
    pub hints: Vec<String>,
}

pub fn present_error(err: &ConsoleError) -> ErrorView {
    let title = match err {
        ConsoleError::Input(_) => "Invalid query",
        ConsoleError::Transport { .. } => "Query failed",
        ConsoleError::Config(_) => "Configuration error",
        ConsoleError::Serialize(_) => "Unreadable response",
    };

    let hints = match err {
        ConsoleError::Transport { detail, .. } if is_generic_http_failure(detail) => {
            GENERIC_HTTP_HINTS.iter().map(|h| h.to_string()).collect()
        }
        _ => Vec::new(),
    };

    ErrorView {
        title: title.to_string(),
        message: err.detail().to_string(),
        hints,
    }
}

/// `HTTP 500`, `HTTP error 502: Bad Gateway` and the like. A backend that
/// explains itself is shown verbatim without hints.
fn is_generic_http_failure(detail: &str) -> bool {
    detail
        .trim()
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}
