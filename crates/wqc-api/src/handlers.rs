//! API Handlers
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use wqc_client::DslTemplate;
use wqc_core::{ConsoleError, Pipeline, ResponseShape, WQC_VERSION};
use wqc_out::{present_error, render_markdown, Presentation};

use crate::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn error_response(state: &AppState, err: &ConsoleError) -> (StatusCode, Json<Value>) {
    state.metrics.record_error(err);
    let status = match err {
        ConsoleError::Input(_) => StatusCode::BAD_REQUEST,
        ConsoleError::Transport { .. } => StatusCode::BAD_GATEWAY,
        ConsoleError::Config(_) | ConsoleError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({ "kind": err.kind(), "error": present_error(err) })),
    )
}

#[derive(Debug, Deserialize)]
pub struct PresentBody {
    pub response: Value,
    #[serde(default)]
    pub elapsed_ms: u64,
    /// Skip classification and read the response as this shape
    #[serde(default)]
    pub shape: Option<ResponseShape>,
}

/// Normalize and present a backend response the caller already holds.
pub async fn present(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PresentBody>,
) -> Json<Presentation> {
    let result = match body.shape {
        Some(shape) => wqc_in::extract(&body.response, shape, body.elapsed_ms),
        None => wqc_in::normalize(&body.response, body.elapsed_ms),
    };
    state.metrics.record_cycle(result.shape);
    Json(state.builder.present(&result))
}

#[derive(Debug, Deserialize)]
pub struct MarkdownBody {
    #[serde(default)]
    pub text: Option<String>,
}

pub async fn markdown(Json(body): Json<MarkdownBody>) -> Json<Value> {
    let html = render_markdown(body.text.as_deref());
    Json(json!({
        "html": html.to_html(),
        "text": html.text_content(),
        "nodes": html,
    }))
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    /// Pipeline tag or short mode name (`advanced`, `dsl`, ...)
    pub mode: String,
    #[serde(default)]
    pub query: String,
    /// Hybrid mode only: DSL object inlined after the question
    #[serde(default)]
    pub dsl: Option<Value>,
}

/// Run one query cycle against the configured backend.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> ApiResult<Value> {
    let mode = Pipeline::from_tag(&body.mode).ok_or_else(|| {
        error_response(&state, &ConsoleError::input(format!("Unknown mode: {}", body.mode)))
    })?;

    let outcome = match body.dsl {
        Some(dsl) if mode == Pipeline::HybridNlDsl => {
            let request = wqc_client::hybrid(&body.query, &dsl).map_err(|e| error_response(&state, &e))?;
            state.session.run(request).await
        }
        Some(_) => Err(ConsoleError::input(format!("{} does not take an inline DSL object", mode))),
        None => state.session.submit(mode, &body.query).await,
    }
    .map_err(|e| error_response(&state, &e))?;

    state.metrics.record_cycle(outcome.result.shape);
    let sequence = outcome.context.sequence;
    Ok(Json(json!({
        "sequence": sequence,
        "trace_id": outcome.context.trace_id,
        "latest": state.session.is_latest(sequence),
        "presentation": outcome.presentation,
    })))
}

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let backend = *state.backend_status.borrow();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": WQC_VERSION,
            "backend": backend,
            "backend_label": backend.label(),
        })),
    )
}

pub async fn dsl_templates() -> Json<Value> {
    let templates: Vec<Value> = DslTemplate::ALL
        .iter()
        .map(|t| json!({ "name": t.name(), "skeleton": t.skeleton(), "text": t.pretty() }))
        .collect();
    Json(json!({ "templates": templates }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, StatusCode> {
    state.metrics.encode().map_err(|e| {
        tracing::error!(error = %e, "metrics encoding failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
