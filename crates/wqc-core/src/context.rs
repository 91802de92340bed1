//! Query Context: identity of one query cycle
use chrono::{DateTime, Utc};

use crate::data_model::Pipeline;

/// Tags a single submission so late resolutions can be recognised as stale.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub session_id: String,
    /// Monotonic within a session, starting at 1
    pub sequence: u64,
    pub trace_id: String,
    pub mode: Pipeline,
    pub dispatched_at: DateTime<Utc>,
}

impl QueryContext {
    pub fn new(session_id: impl Into<String>, sequence: u64, mode: Pipeline) -> Self {
        Self {
            session_id: session_id.into(),
            sequence,
            trace_id: uuid::Uuid::new_v4().to_string(),
            mode,
            dispatched_at: Utc::now(),
        }
    }
}
