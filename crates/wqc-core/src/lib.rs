//! WQC Core: data model, severity tiers and error taxonomy
//!
//! Shared vocabulary for the Wazuh query console: what a request looks like,
//! what the engine derives from a response, and how failures are reported.

pub mod context;
pub mod data_model;
pub mod error;
pub mod severity;

pub use context::QueryContext;
pub use data_model::{
    AgentRecord, AlertRecord, BucketRecord, CanonicalResult, ClassifiedRecord, Pipeline,
    QueryRequest, ResponseShape, RoutingDecision, SearchHitRecord,
};
pub use error::ConsoleError;
pub use severity::{classify_severity, Severity};

/// Engine version
pub const WQC_VERSION: &str = "1.0.0";

/// Placeholder for any record field the backend left out
pub const NOT_AVAILABLE: &str = "N/A";
