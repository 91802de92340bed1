//! WQC-OUT: Canonical results to presentation blocks
//!
//! Converts a [`CanonicalResult`](wqc_core::CanonicalResult) into an ordered
//! list of typed display blocks. Narrative markdown is rendered to an escaped
//! node tree; badge captions and notices come from handlebars templates.
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use wqc_out::present;
//!
//! let result = wqc_in::normalize(&json!({"summary": "All **clear**"}), 12);
//! let presentation = present(&result);
//! assert_eq!(presentation.blocks[0].kind(), "narrative_text");
//! ```

pub mod blocks;
pub mod error_view;
pub mod markdown;
pub mod present;
pub mod renderer;
pub mod templates;

pub use blocks::{
    CardField, CardKind, ConfidenceTone, PresentationBlock, RawJsonBlock, RawSource, RecordCard,
    RoutingBadge,
};
pub use error_view::{present_error, ErrorView};
pub use markdown::{render_markdown, SafeHtml};
pub use present::{build, present, Presentation, PresentationBuilder, PresentationConfig};

use thiserror::Error;

/// Errors raised while setting up a builder. Building itself never fails.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("TEMPLATE/{0}")]
    Template(String),
    #[error("CONFIG/{0}")]
    Config(String),
}
