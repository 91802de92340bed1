//! Data Model: QueryRequest, RoutingDecision, CanonicalResult, ClassifiedRecord
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConsoleError;
use crate::severity::Severity;

/// Backend query path. Doubles as the request mode and the routed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pipeline {
    #[serde(rename = "SIMPLE_PIPELINE")]
    Simple,
    #[serde(rename = "ADVANCED_PIPELINE")]
    Advanced,
    #[serde(rename = "DIRECT_DSL")]
    DirectDsl,
    #[serde(rename = "HYBRID_NL_DSL")]
    HybridNlDsl,
}

impl Pipeline {
    pub const ALL: [Pipeline; 4] = [
        Pipeline::Simple,
        Pipeline::Advanced,
        Pipeline::DirectDsl,
        Pipeline::HybridNlDsl,
    ];

    /// Parse a pipeline tag as the backend emits it (`ADVANCED_PIPELINE`)
    /// or one of the short mode names the page uses (`advanced`, `dsl`, `hybrid`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "SIMPLE_PIPELINE" | "SIMPLE" => Some(Pipeline::Simple),
            "ADVANCED_PIPELINE" | "ADVANCED" => Some(Pipeline::Advanced),
            "DIRECT_DSL" | "DSL" => Some(Pipeline::DirectDsl),
            "HYBRID_NL_DSL" | "HYBRID" => Some(Pipeline::HybridNlDsl),
            _ => None,
        }
    }

    /// Wire tag
    pub fn tag(&self) -> &'static str {
        match self {
            Pipeline::Simple => "SIMPLE_PIPELINE",
            Pipeline::Advanced => "ADVANCED_PIPELINE",
            Pipeline::DirectDsl => "DIRECT_DSL",
            Pipeline::HybridNlDsl => "HYBRID_NL_DSL",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Pipeline::Simple => "Simple",
            Pipeline::Advanced => "Advanced",
            Pipeline::DirectDsl => "Direct DSL",
            Pipeline::HybridNlDsl => "Hybrid NL+DSL",
        }
    }

    /// Whether requests in this mode carry a DSL object instead of text
    pub fn takes_dsl(&self) -> bool {
        matches!(self, Pipeline::DirectDsl)
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A submitted query. Exactly one of `text` / `dsl` is set, matching `mode`.
///
/// Fields are private; the constructors below keep the payload in step with
/// the mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    mode: Pipeline,
    text: Option<String>,
    dsl: Option<Value>,
}

impl QueryRequest {
    /// Text request for any mode except `DirectDsl`. Blank text is refused.
    pub fn with_text(mode: Pipeline, text: impl Into<String>) -> Result<Self, ConsoleError> {
        if mode.takes_dsl() {
            return Err(ConsoleError::input(format!("{} takes a DSL object, not text", mode)));
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ConsoleError::input("Please enter a query"));
        }
        Ok(Self {
            mode,
            text: Some(text),
            dsl: None,
        })
    }

    /// DSL request, always `Pipeline::DirectDsl`.
    pub fn with_dsl(dsl: Value) -> Self {
        Self {
            mode: Pipeline::DirectDsl,
            text: None,
            dsl: Some(dsl),
        }
    }

    pub fn mode(&self) -> Pipeline {
        self.mode
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn dsl(&self) -> Option<&Value> {
        self.dsl.as_ref()
    }
}

/// Backend-reported pipeline choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub pipeline: Pipeline,
    /// Always within [0, 1]
    pub confidence: f64,
    pub reasoning: String,
}

impl RoutingDecision {
    pub fn new(pipeline: Pipeline, confidence: f64, reasoning: impl Into<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            pipeline,
            confidence,
            reasoning: reasoning.into(),
        }
    }

    /// Confidence as a whole percentage (0.92 -> 92)
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round() as u8
    }
}

/// Structural category of a response payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    AgentList,
    AlertList,
    SearchHits,
    Aggregations,
    Unknown,
}

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::AgentList => "agent_list",
            ResponseShape::AlertList => "alert_list",
            ResponseShape::SearchHits => "search_hits",
            ResponseShape::Aggregations => "aggregations",
            ResponseShape::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub ip: String,
    pub os: String,
    pub last_keep_alive: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub rule_id: String,
    pub description: String,
    pub level: Option<i64>,
    pub severity: Severity,
    pub agent_name: String,
    pub timestamp: String,
    pub source_ip: Option<String>,
    pub dest_ip: Option<String>,
}

/// Search hit reduced to the card fields. Every field is optional; absent
/// fields are left out of the card rather than defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHitRecord {
    pub id: Option<String>,
    pub description: Option<String>,
    pub level: Option<i64>,
    pub severity: Option<Severity>,
    pub agent_name: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRecord {
    /// Name of the aggregation the bucket came from (`by_agent`)
    pub aggregation: String,
    pub key: String,
    pub doc_count: u64,
}

/// One normalized item within a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum ClassifiedRecord {
    Agent(AgentRecord),
    Alert(AlertRecord),
    SearchHit(SearchHitRecord),
    AggregationBucket(BucketRecord),
    Unknown(Value),
}

/// Engine-owned summary of one query cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalResult {
    pub total_count: u64,
    pub elapsed_ms: u64,
    pub routing: Option<RoutingDecision>,
    pub narrative: Option<String>,
    pub dsl: Option<Value>,
    /// Backend order preserved
    pub records: Vec<ClassifiedRecord>,
    pub shape: ResponseShape,
    /// The full response, verbatim, for the raw view
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pipeline_tags() {
        assert_eq!(Pipeline::from_tag("ADVANCED_PIPELINE"), Some(Pipeline::Advanced));
        assert_eq!(Pipeline::from_tag("dsl"), Some(Pipeline::DirectDsl));
        assert_eq!(Pipeline::from_tag(" hybrid "), Some(Pipeline::HybridNlDsl));
        assert_eq!(Pipeline::from_tag("QUANTUM"), None);
        for p in Pipeline::ALL {
            assert_eq!(Pipeline::from_tag(p.tag()), Some(p));
        }
    }

    #[test]
    fn test_pipeline_serde_uses_wire_tag() {
        assert_eq!(serde_json::to_value(Pipeline::DirectDsl).unwrap(), json!("DIRECT_DSL"));
        let p: Pipeline = serde_json::from_value(json!("SIMPLE_PIPELINE")).unwrap();
        assert_eq!(p, Pipeline::Simple);
    }

    #[test]
    fn test_routing_confidence_clamped() {
        assert_eq!(RoutingDecision::new(Pipeline::Simple, 1.7, "").confidence, 1.0);
        assert_eq!(RoutingDecision::new(Pipeline::Simple, -0.2, "").confidence, 0.0);
        assert_eq!(RoutingDecision::new(Pipeline::Simple, f64::NAN, "").confidence, 0.0);
        assert_eq!(RoutingDecision::new(Pipeline::Advanced, 0.92, "").confidence_percent(), 92);
    }

    #[test]
    fn test_request_exclusive_payload() {
        let text = QueryRequest::with_text(Pipeline::Simple, "list agents").unwrap();
        assert!(text.dsl().is_none());
        assert_eq!(text.text(), Some("list agents"));

        let dsl = QueryRequest::with_dsl(json!({"query": {"match_all": {}}}));
        assert_eq!(dsl.mode(), Pipeline::DirectDsl);
        assert!(dsl.text().is_none());
    }

    #[test]
    fn test_text_request_refuses_dsl_mode() {
        let err = QueryRequest::with_text(Pipeline::DirectDsl, "not json at all").unwrap_err();
        assert_eq!(err.kind(), "input");
        assert_eq!(err, ConsoleError::input("DIRECT_DSL takes a DSL object, not text"));

        assert!(QueryRequest::with_text(Pipeline::Advanced, "  ").is_err());
        let hybrid = QueryRequest::with_text(Pipeline::HybridNlDsl, "why {}").unwrap();
        assert_eq!(hybrid.mode(), Pipeline::HybridNlDsl);
    }
}
