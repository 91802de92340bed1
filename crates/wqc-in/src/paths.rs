//! Optional-path access over untrusted JSON.
//!
//! Every lookup returns `Option`; nothing here indexes or panics.

use serde_json::Value;

/// Envelope keys the backend pipelines wrap their payload in, checked after
/// the response root itself.
pub const ENVELOPE_KEYS: [&str; 4] = ["raw_data", "raw_results", "result", "results"];

/// Walk an object path (`["data", "affected_items"]`).
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Candidate payload roots: the response, then each envelope that is present.
pub fn search_roots(resp: &Value) -> Vec<&Value> {
    let mut roots = vec![resp];
    for key in ENVELOPE_KEYS {
        if let Some(inner) = resp.get(key) {
            if inner.is_object() || inner.is_array() {
                roots.push(inner);
            }
        }
    }
    roots
}

/// Display text for a scalar. Objects, arrays, null and blank strings have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `scalar_text` at a path
pub fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    get_path(value, path).and_then(scalar_text)
}

/// Non-negative integer count. Accepts integers, non-negative floats
/// (truncated) and digit strings.
pub fn count_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Search-style total: a bare number or `{ "value": n }`
pub fn hits_total(value: &Value) -> Option<u64> {
    count_of(value).or_else(|| value.get("value").and_then(count_of))
}
