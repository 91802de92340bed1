//! Request construction: user input -> validated QueryRequest -> endpoint + body.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use wqc_core::{ConsoleError, Pipeline, QueryRequest};

pub const EMPTY_QUERY: &str = "Please enter a query";
pub const EMPTY_DSL: &str = "Please enter a DSL query";
pub const INVALID_DSL: &str = "Invalid JSON in DSL query";
pub const DSL_NOT_OBJECT: &str = "DSL query must be a JSON object";

/// Validate raw input for `mode`. Nothing is sent when this fails.
pub fn parse_input(mode: Pipeline, raw: &str) -> Result<QueryRequest, ConsoleError> {
    let raw = raw.trim();
    if !mode.takes_dsl() {
        if raw.is_empty() {
            return Err(ConsoleError::input(EMPTY_QUERY));
        }
        return QueryRequest::with_text(mode, raw);
    }

    if raw.is_empty() {
        return Err(ConsoleError::input(EMPTY_DSL));
    }
    let dsl: Value = serde_json::from_str(raw).map_err(|_| ConsoleError::input(INVALID_DSL))?;
    if !dsl.is_object() {
        return Err(ConsoleError::input(DSL_NOT_OBJECT));
    }
    Ok(QueryRequest::with_dsl(dsl))
}

/// Natural-language context with a DSL object inlined. The backend finds
/// the first `{...}` span and runs it, using the rest as the question.
pub fn hybrid(context: &str, dsl: &Value) -> Result<QueryRequest, ConsoleError> {
    if !dsl.is_object() {
        return Err(ConsoleError::input(DSL_NOT_OBJECT));
    }
    let context = context.trim();
    let text = if context.is_empty() {
        dsl.to_string()
    } else {
        format!("{} {}", context, dsl)
    };
    QueryRequest::with_text(Pipeline::HybridNlDsl, text)
}

/// Backend path layout. `Legacy` is the earlier RPC-style deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointLayout {
    #[default]
    Current,
    Legacy,
}

impl EndpointLayout {
    pub fn path_for(&self, mode: Pipeline) -> &'static str {
        match (self, mode) {
            (_, Pipeline::Simple) => "/query/simple",
            (EndpointLayout::Current, Pipeline::Advanced) => "/query/",
            (EndpointLayout::Legacy, Pipeline::Advanced) => "/query/nl",
            (EndpointLayout::Current, Pipeline::DirectDsl) => "/query/dsl",
            (EndpointLayout::Legacy, Pipeline::DirectDsl) => "/mcp/wazuh.search",
            (_, Pipeline::HybridNlDsl) => "/query/nl",
        }
    }

    pub fn health_path(&self) -> &'static str {
        match self {
            EndpointLayout::Current => "/health",
            EndpointLayout::Legacy => "/",
        }
    }

    pub fn health_interval(&self) -> Duration {
        match self {
            EndpointLayout::Current => Duration::from_secs(5),
            EndpointLayout::Legacy => Duration::from_secs(30),
        }
    }
}

/// What goes on the wire for one request
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub path: &'static str,
    pub body: Value,
}

/// Pick the endpoint and body. DSL requests post the object verbatim.
pub fn route(request: &QueryRequest, layout: EndpointLayout) -> OutboundRequest {
    let body = match request.dsl() {
        Some(dsl) => dsl.clone(),
        None => json!({ "query": request.text().unwrap_or_default() }),
    };
    OutboundRequest {
        path: layout.path_for(request.mode()),
        body,
    }
}

/// Fill-in skeletons offered in the DSL editor. Never validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DslTemplate {
    /// Elasticsearch bool/range query
    ElasticBool,
    /// `{indices, time, filters, limit}` search plan
    StructuredFilter,
}

impl DslTemplate {
    pub const ALL: [DslTemplate; 2] = [DslTemplate::ElasticBool, DslTemplate::StructuredFilter];

    pub fn name(&self) -> &'static str {
        match self {
            DslTemplate::ElasticBool => "elastic_bool",
            DslTemplate::StructuredFilter => "structured_filter",
        }
    }

    pub fn skeleton(&self) -> Value {
        match self {
            DslTemplate::ElasticBool => json!({
                "index": "wazuh-alerts-*",
                "query": {
                    "bool": {
                        "must": [
                            {"range": {"timestamp": {"gte": "now-24h", "lte": "now"}}},
                            {"range": {"rule.level": {"gte": 8}}}
                        ]
                    }
                },
                "size": 50,
                "sort": [{"timestamp": {"order": "desc"}}]
            }),
            DslTemplate::StructuredFilter => json!({
                "indices": ["wazuh-alerts-*"],
                "time": {"from": "now-24h", "to": "now"},
                "filters": [{"field": "rule.level", "operator": "gte", "value": 8}],
                "limit": 50
            }),
        }
    }

    /// Editor text, two-space indented
    pub fn pretty(&self) -> String {
        let skeleton = self.skeleton();
        serde_json::to_string_pretty(&skeleton).unwrap_or_else(|_| skeleton.to_string())
    }
}
