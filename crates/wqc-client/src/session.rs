//! Query session: one submission at a time, tagged for stale filtering.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use wqc_core::{CanonicalResult, ConsoleError, Pipeline, QueryContext, QueryRequest};
use wqc_out::{Presentation, PresentationBuilder};

use crate::request::{parse_input, route, EndpointLayout};
use crate::transport::Transport;

/// Everything one successful cycle produced
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub context: QueryContext,
    pub result: CanonicalResult,
    pub presentation: Presentation,
}

/// Runs query cycles against one backend. Holds no result state; each
/// cycle's outcome belongs to the caller.
pub struct QuerySession {
    id: String,
    transport: Arc<dyn Transport>,
    layout: EndpointLayout,
    builder: Arc<PresentationBuilder>,
    sequence: AtomicU64,
    in_flight: Mutex<()>,
}

impl QuerySession {
    pub fn new(
        transport: Arc<dyn Transport>,
        layout: EndpointLayout,
        builder: Arc<PresentationBuilder>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            transport,
            layout,
            builder,
            sequence: AtomicU64::new(0),
            in_flight: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Validate raw input, then run it. Input errors send nothing.
    pub async fn submit(&self, mode: Pipeline, raw: &str) -> Result<QueryOutcome, ConsoleError> {
        let request = parse_input(mode, raw)?;
        self.run(request).await
    }

    pub async fn run(&self, request: QueryRequest) -> Result<QueryOutcome, ConsoleError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let context = QueryContext::new(self.id.as_str(), sequence, request.mode());
        let outbound = route(&request, self.layout);

        let _guard = self.in_flight.lock().await;
        tracing::info!(
            trace_id = %context.trace_id,
            sequence,
            mode = %context.mode,
            path = outbound.path,
            "dispatching query"
        );

        let started = Instant::now();
        let response = self.transport.post_json(outbound.path, &outbound.body).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = response.map_err(|e| {
            tracing::warn!(trace_id = %context.trace_id, sequence, error = %e, "query failed");
            e
        })?;

        let result = wqc_in::normalize(&response, elapsed_ms);
        let presentation = self.builder.present(&result);
        tracing::info!(
            trace_id = %context.trace_id,
            sequence,
            shape = %result.shape,
            total = result.total_count,
            elapsed_ms = result.elapsed_ms,
            "query complete"
        );

        Ok(QueryOutcome {
            context,
            result,
            presentation,
        })
    }

    /// True when no later submission has started. Callers drop outcomes
    /// for which this is false.
    pub fn is_latest(&self, sequence: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == sequence
    }
}
