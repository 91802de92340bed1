//! Canonical result extraction.
//!
//! Pulls count, timing, routing, narrative, DSL echo and typed records out of
//! a classified response. Every lookup degrades to a documented default;
//! nothing here returns an error.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use wqc_core::{
    classify_severity, AgentRecord, AlertRecord, BucketRecord, CanonicalResult, ClassifiedRecord, Pipeline,
    ResponseShape, RoutingDecision, SearchHitRecord, NOT_AVAILABLE,
};

use crate::paths::{count_of, get_path, hits_total, scalar_text, search_roots, text_at};
use crate::shape::{aggregation_buckets, collection_for};

/// Reasoning attached to a routing decision synthesised from a bare pipeline tag
pub const BYPASS_REASONING: &str = "Direct pipeline call; adaptive routing was bypassed";

/// Description used when an alert has no rule description
pub const UNKNOWN_RULE: &str = "Unknown rule";

lazy_static! {
    /// `"0.42s"`, `"420ms"`, `"1.5 seconds"`, `"3"`
    static ref DURATION: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(ms|s|sec|secs|seconds)?\s*$").unwrap();
}

/// Server timing fields, most specific first. The flag says whether a bare
/// number is seconds (`query_time`) rather than milliseconds.
const TIMING_FIELDS: [(&str, bool); 4] = [
    ("elapsed_ms", false),
    ("execution_time_ms", false),
    ("query_time", true),
    ("took", false),
];

/// Extract a canonical result for an already classified response.
pub fn extract(resp: &Value, shape: ResponseShape, request_elapsed_ms: u64) -> CanonicalResult {
    let records = extract_records(resp, shape);
    let total_count = resolve_total(resp, records.len());
    let elapsed_ms = server_elapsed_ms(resp).unwrap_or(request_elapsed_ms);

    let result = CanonicalResult {
        total_count,
        elapsed_ms,
        routing: resolve_routing(resp),
        narrative: resolve_narrative(resp),
        dsl: resolve_dsl(resp),
        records,
        shape,
        raw: resp.clone(),
    };

    tracing::debug!(
        shape = %shape,
        total = result.total_count,
        records = result.records.len(),
        elapsed_ms = result.elapsed_ms,
        routed = result.routing.is_some(),
        "extracted canonical result"
    );
    result
}

/// Count resolution: explicit total → search total → agent API total →
/// number of records.
pub fn resolve_total(resp: &Value, record_count: usize) -> u64 {
    let roots = search_roots(resp);

    let explicit = roots.iter().find_map(|root| {
        ["total_hits", "total"]
            .iter()
            .find_map(|key| root.get(*key).and_then(count_of))
    });
    let search = || {
        roots
            .iter()
            .find_map(|root| get_path(root, &["hits", "total"]).and_then(hits_total))
    };
    let agent_api = || {
        roots
            .iter()
            .find_map(|root| get_path(root, &["data", "total_affected_items"]).and_then(count_of))
    };

    explicit
        .or_else(search)
        .or_else(agent_api)
        .unwrap_or(record_count as u64)
}

/// Server-reported execution time in milliseconds, if any.
pub fn server_elapsed_ms(resp: &Value) -> Option<u64> {
    let roots = search_roots(resp);
    TIMING_FIELDS.iter().find_map(|(key, bare_is_secs)| {
        roots
            .iter()
            .find_map(|root| root.get(*key).and_then(|v| duration_ms(v, *bare_is_secs)))
    })
}

/// Parse a duration value into milliseconds.
pub fn duration_ms(value: &Value, bare_is_secs: bool) -> Option<u64> {
    let scale = if bare_is_secs { 1000.0 } else { 1.0 };
    let ms = match value {
        Value::Number(n) => n.as_f64()? * scale,
        Value::String(s) => {
            let caps = DURATION.captures(s)?;
            let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
            match caps.get(2).map(|m| m.as_str()) {
                Some("ms") => amount,
                Some(_) => amount * 1000.0,
                None => amount * scale,
            }
        }
        _ => return None,
    };
    (ms.is_finite() && ms >= 0.0).then(|| ms.round() as u64)
}

/// Routing decision: verbatim when present, synthesised from a bare pipeline
/// tag otherwise.
pub fn resolve_routing(resp: &Value) -> Option<RoutingDecision> {
    let bare = resp
        .get("pipeline")
        .and_then(Value::as_str)
        .and_then(Pipeline::from_tag);

    if let Some(routing) = resp.get("routing").filter(|r| r.is_object()) {
        return Some(parse_routing(routing, bare));
    }

    let pipeline = bare?;
    tracing::debug!(pipeline = %pipeline, "synthesising routing for bypassed pipeline");
    Some(RoutingDecision::new(pipeline, 1.0, BYPASS_REASONING))
}

/// A routing object always yields a decision. An unrecognised tag takes the
/// bare `pipeline` tag, else reads as Advanced like any non-simple route.
fn parse_routing(routing: &Value, bare: Option<Pipeline>) -> RoutingDecision {
    let tag = routing.get("pipeline").and_then(Value::as_str);
    let pipeline = match tag.and_then(Pipeline::from_tag).or(bare) {
        Some(pipeline) => pipeline,
        None => {
            tracing::debug!(tag = ?tag, "unrecognised routing pipeline, showing as advanced");
            Pipeline::Advanced
        }
    };
    let confidence = routing
        .get("confidence")
        .and_then(|c| c.as_f64().or_else(|| c.as_str()?.trim().parse().ok()))
        .unwrap_or(0.0);
    let reasoning = routing
        .get("reasoning")
        .and_then(scalar_text)
        .unwrap_or_default();
    RoutingDecision::new(pipeline, confidence, reasoning)
}

/// First non-blank of `summary`, `formatted_response` and the plain
/// `response` string the `/query/` endpoints return.
pub fn resolve_narrative(resp: &Value) -> Option<String> {
    ["summary", "formatted_response", "response"].iter().find_map(|key| {
        resp.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

/// Echoed DSL: `dsl`, else the hybrid pipeline's `embedded_dsl`.
pub fn resolve_dsl(resp: &Value) -> Option<Value> {
    ["dsl", "embedded_dsl"]
        .iter()
        .find_map(|key| resp.get(*key).filter(|v| !v.is_null()).cloned())
}

/// Records for `shape`, in backend order.
pub fn extract_records(resp: &Value, shape: ResponseShape) -> Vec<ClassifiedRecord> {
    match shape {
        ResponseShape::AgentList => typed_entries(resp, shape, |e| ClassifiedRecord::Agent(agent_record(e))),
        ResponseShape::AlertList => typed_entries(resp, shape, |e| ClassifiedRecord::Alert(alert_record(e))),
        ResponseShape::SearchHits => {
            typed_entries(resp, shape, |e| ClassifiedRecord::SearchHit(search_hit_record(e)))
        }
        ResponseShape::Aggregations => aggregation_buckets(resp)
            .into_iter()
            .flat_map(|(name, buckets)| {
                buckets
                    .iter()
                    .map(move |bucket| ClassifiedRecord::AggregationBucket(bucket_record(name, bucket)))
            })
            .collect(),
        ResponseShape::Unknown => Vec::new(),
    }
}

/// Object entries go through `build`; anything else is kept as `Unknown`.
fn typed_entries(
    resp: &Value,
    shape: ResponseShape,
    build: impl Fn(&Value) -> ClassifiedRecord,
) -> Vec<ClassifiedRecord> {
    let Some(entries) = collection_for(resp, shape) else {
        tracing::debug!(shape = %shape, "no collection found for forced shape");
        return Vec::new();
    };
    entries
        .iter()
        .map(|entry| {
            if entry.is_object() {
                build(entry)
            } else {
                ClassifiedRecord::Unknown(entry.clone())
            }
        })
        .collect()
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn timestamp_of(source: &Value) -> Option<String> {
    text_at(source, &["timestamp"]).or_else(|| text_at(source, &["@timestamp"]))
}

pub fn agent_record(entry: &Value) -> AgentRecord {
    let os = [text_at(entry, &["os", "name"]), text_at(entry, &["os", "version"])]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    AgentRecord {
        id: or_na(text_at(entry, &["id"])),
        name: or_na(text_at(entry, &["name"])),
        status: or_na(text_at(entry, &["status"])),
        ip: or_na(text_at(entry, &["ip"])),
        os: if os.is_empty() { NOT_AVAILABLE.to_string() } else { os },
        last_keep_alive: or_na(
            text_at(entry, &["lastKeepAlive"]).or_else(|| text_at(entry, &["last_keep_alive"])),
        ),
    }
}

pub fn alert_record(entry: &Value) -> AlertRecord {
    let level = get_path(entry, &["rule", "level"]).and_then(wqc_core::Severity::level_from_value);
    AlertRecord {
        rule_id: or_na(text_at(entry, &["rule", "id"])),
        description: text_at(entry, &["rule", "description"]).unwrap_or_else(|| UNKNOWN_RULE.to_string()),
        level,
        severity: classify_severity(level),
        agent_name: or_na(text_at(entry, &["agent", "name"])),
        timestamp: or_na(timestamp_of(entry)),
        source_ip: text_at(entry, &["data", "srcip"]),
        dest_ip: text_at(entry, &["data", "dstip"]),
    }
}

/// Only the compact card subset: description, severity, agent, timestamp.
pub fn search_hit_record(hit: &Value) -> SearchHitRecord {
    let source = hit.get("_source").filter(|s| s.is_object()).unwrap_or(hit);
    let level = get_path(source, &["rule", "level"]).and_then(wqc_core::Severity::level_from_value);
    SearchHitRecord {
        id: text_at(hit, &["_id"]),
        description: text_at(source, &["rule", "description"]),
        level,
        severity: level.map(|l| classify_severity(Some(l))),
        agent_name: text_at(source, &["agent", "name"]),
        timestamp: timestamp_of(source),
    }
}

pub fn bucket_record(aggregation: &str, bucket: &Value) -> BucketRecord {
    let key = text_at(bucket, &["key_as_string"])
        .or_else(|| text_at(bucket, &["key"]))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    BucketRecord {
        aggregation: aggregation.to_string(),
        key,
        doc_count: bucket.get("doc_count").and_then(count_of).unwrap_or(0),
    }
}
