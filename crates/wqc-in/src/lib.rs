//! WQC-IN: Response normalization
//!
//! Turns a structurally inconsistent backend response into a
//! [`CanonicalResult`]: the payload shape is classified first, then count,
//! timing, routing, narrative and typed records are extracted for that shape.
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use wqc_in::normalize;
//!
//! let resp = json!({"hits": {"total": {"value": 3}, "hits": [{"_source": {"rule": {"level": 14}}}]}});
//! let result = normalize(&resp, 120);
//! assert_eq!(result.total_count, 3);
//! ```

pub mod extract;
pub mod paths;
pub mod shape;

pub use extract::{extract, BYPASS_REASONING, UNKNOWN_RULE};
pub use shape::classify_shape;

use serde_json::Value;
use wqc_core::CanonicalResult;

/// Classify then extract in one step.
pub fn normalize(resp: &Value, request_elapsed_ms: u64) -> CanonicalResult {
    let shape = classify_shape(resp);
    extract(resp, shape, request_elapsed_ms)
}
