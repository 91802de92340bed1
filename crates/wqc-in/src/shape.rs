//! Response shape classification.
//!
//! The backend is a family of pipelines (Wazuh REST pass-through, indexer
//! search, AI-summarised hybrid) with different envelopes. Classification
//! walks a fixed precedence and falls back to `Unknown`, so it is total:
//!
//! 1. `AgentList`    - item collection whose entries carry `id` and `status`
//! 2. `AlertList`    - list whose entries carry `rule.level`
//! 3. `SearchHits`   - `hits.total` plus `hits.hits[*]._source`
//! 4. `Aggregations` - `aggregations.*.buckets[*].{key, doc_count}`
//! 5. `Unknown`
//!
//! Each rule is tried against the response root first, then against the
//! `raw_data` / `raw_results` / `result` / `results` envelopes.

use serde_json::Value;
use wqc_core::ResponseShape;

use crate::paths::{get_path, hits_total, search_roots};

/// Where agent inventories live (`/agents` returns `data.affected_items`,
/// the simple pipeline re-wraps them as `agents`).
const AGENT_PATHS: [&[&str]; 4] = [
    &["data", "affected_items"],
    &["affected_items"],
    &["agents"],
    &["items"],
];

/// Where alert lists live; the empty path means the root is the list.
const ALERT_PATHS: [&[&str]; 5] = [
    &[],
    &["alerts"],
    &["data", "affected_items"],
    &["affected_items"],
    &["items"],
];

/// Classify a response. Never fails.
pub fn classify_shape(resp: &Value) -> ResponseShape {
    let shape = if agent_items(resp).is_some() {
        ResponseShape::AgentList
    } else if alert_items(resp).is_some() {
        ResponseShape::AlertList
    } else if search_hits(resp).is_some() {
        ResponseShape::SearchHits
    } else if !aggregation_buckets(resp).is_empty() {
        ResponseShape::Aggregations
    } else {
        ResponseShape::Unknown
    };

    tracing::debug!(shape = %shape, "classified response");
    shape
}

/// Arrays found at `paths` under every search root, in precedence order.
fn candidates<'a>(resp: &'a Value, paths: &[&[&str]]) -> Vec<&'a Vec<Value>> {
    let mut found = Vec::new();
    for root in search_roots(resp) {
        for path in paths {
            if let Some(Value::Array(items)) = get_path(root, path) {
                found.push(items);
            }
        }
    }
    found
}

fn first_matching<'a>(resp: &'a Value, paths: &[&[&str]], entry_ok: fn(&Value) -> bool) -> Option<&'a Vec<Value>> {
    candidates(resp, paths)
        .into_iter()
        .find(|items| !items.is_empty() && items.iter().all(entry_ok))
}

/// Loosest reading: the first non-empty candidate array, else the first
/// candidate at all.
fn first_candidate<'a>(resp: &'a Value, paths: &[&[&str]]) -> Option<&'a Vec<Value>> {
    let found = candidates(resp, paths);
    found
        .iter()
        .find(|items| !items.is_empty())
        .or_else(|| found.first())
        .copied()
}

fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}

fn is_agent_entry(entry: &Value) -> bool {
    entry.is_object() && is_present(entry.get("id")) && is_present(entry.get("status"))
}

fn is_alert_entry(entry: &Value) -> bool {
    get_path(entry, &["rule"]).is_some_and(Value::is_object) && is_present(get_path(entry, &["rule", "level"]))
}

fn is_hit_entry(entry: &Value) -> bool {
    entry.get("_source").is_some_and(Value::is_object)
}

fn is_bucket(entry: &Value) -> bool {
    entry.is_object() && is_present(entry.get("key")) && is_present(entry.get("doc_count"))
}

/// Agent inventory entries, validated
pub fn agent_items(resp: &Value) -> Option<&Vec<Value>> {
    first_matching(resp, &AGENT_PATHS, is_agent_entry)
}

/// Alert entries, validated
pub fn alert_items(resp: &Value) -> Option<&Vec<Value>> {
    first_matching(resp, &ALERT_PATHS, is_alert_entry)
}

/// Search envelope: the `hits` object holding `total` and the hit array.
pub struct SearchEnvelope<'a> {
    pub total: u64,
    pub hits: &'a Vec<Value>,
}

fn search_envelope_at(root: &Value) -> Option<SearchEnvelope<'_>> {
    let hits_obj = root.get("hits")?.as_object()?;
    let total = hits_total(hits_obj.get("total")?)?;
    let hits = hits_obj.get("hits")?.as_array()?;
    if !hits.iter().all(is_hit_entry) {
        return None;
    }
    // size:0 aggregation queries come back with an empty hit list; the
    // buckets are the payload then.
    if hits.is_empty() && !bucketed(root).is_empty() {
        return None;
    }
    Some(SearchEnvelope {
        total,
        hits,
    })
}

/// Search hits, validated
pub fn search_hits(resp: &Value) -> Option<SearchEnvelope<'_>> {
    search_roots(resp).into_iter().find_map(search_envelope_at)
}

/// Bucketed aggregations at one root, in backend key order
fn bucketed(root: &Value) -> Vec<(&String, &Vec<Value>)> {
    let Some(aggs) = root.get("aggregations").and_then(Value::as_object) else {
        return Vec::new();
    };
    let found: Vec<(&String, &Vec<Value>)> = aggs
        .iter()
        .filter_map(|(name, agg)| agg.get("buckets").and_then(Value::as_array).map(|b| (name, b)))
        .collect();
    if found.iter().all(|(_, buckets)| buckets.iter().all(is_bucket)) {
        found
    } else {
        Vec::new()
    }
}

/// Aggregation buckets grouped by aggregation name. Empty when the response
/// carries no valid bucketed aggregation.
pub fn aggregation_buckets(resp: &Value) -> Vec<(&String, &Vec<Value>)> {
    search_roots(resp)
        .into_iter()
        .map(bucketed)
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Collection to extract for `shape`. Prefers the validated collection and
/// falls back to the first collection at a conventional path, so a caller
/// forcing a shape still gets its entries.
pub fn collection_for(resp: &Value, shape: ResponseShape) -> Option<&Vec<Value>> {
    match shape {
        ResponseShape::AgentList => agent_items(resp).or_else(|| first_candidate(resp, &AGENT_PATHS)),
        ResponseShape::AlertList => alert_items(resp).or_else(|| first_candidate(resp, &ALERT_PATHS)),
        ResponseShape::SearchHits => search_hits(resp).map(|env| env.hits).or_else(|| {
            search_roots(resp)
                .into_iter()
                .find_map(|root| get_path(root, &["hits", "hits"]).and_then(Value::as_array))
        }),
        ResponseShape::Aggregations | ResponseShape::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_list() {
        let resp = json!({"data": {"affected_items": [{"id": "001", "status": "active"}]}});
        assert_eq!(classify_shape(&resp), ResponseShape::AgentList);
    }

    #[test]
    fn test_agent_list_inside_envelope() {
        let resp = json!({
            "pipeline": "SIMPLE_PIPELINE",
            "raw_data": {"total": 1, "agents": [{"id": "000", "status": "active", "name": "manager"}]}
        });
        assert_eq!(classify_shape(&resp), ResponseShape::AgentList);
    }

    #[test]
    fn test_alert_list_from_bare_array() {
        let resp = json!([{"rule": {"level": 3, "description": "x"}}]);
        assert_eq!(classify_shape(&resp), ResponseShape::AlertList);
    }

    #[test]
    fn test_alert_list_needs_every_entry() {
        let resp = json!({"alerts": [{"rule": {"level": 3}}, {"rule": {}}]});
        assert_eq!(classify_shape(&resp), ResponseShape::Unknown);
    }

    #[test]
    fn test_agent_beats_alert() {
        // entries satisfy both rules; agent precedence wins
        let resp = json!({"items": [{"id": "7", "status": "active", "rule": {"level": 12}}]});
        assert_eq!(classify_shape(&resp), ResponseShape::AgentList);
    }

    #[test]
    fn test_search_hits() {
        let resp = json!({"hits": {"total": {"value": 1}, "hits": [{"_source": {"a": 1}}]}});
        assert_eq!(classify_shape(&resp), ResponseShape::SearchHits);

        let bare_total = json!({"hits": {"total": 0, "hits": []}});
        assert_eq!(classify_shape(&bare_total), ResponseShape::SearchHits);
    }

    #[test]
    fn test_search_hits_require_source() {
        let resp = json!({"hits": {"total": 1, "hits": [{"_id": "x"}]}});
        assert_eq!(classify_shape(&resp), ResponseShape::Unknown);
    }

    #[test]
    fn test_empty_hits_with_buckets_is_aggregation() {
        let resp = json!({
            "hits": {"total": {"value": 49}, "hits": []},
            "aggregations": {"by_agent": {"buckets": [{"key": "web1", "doc_count": 42}]}}
        });
        assert_eq!(classify_shape(&resp), ResponseShape::Aggregations);
    }

    #[test]
    fn test_non_empty_hits_beat_buckets() {
        let resp = json!({
            "hits": {"total": 1, "hits": [{"_source": {}}]},
            "aggregations": {"by_agent": {"buckets": [{"key": "web1", "doc_count": 1}]}}
        });
        assert_eq!(classify_shape(&resp), ResponseShape::SearchHits);
    }

    #[test]
    fn test_aggregations() {
        let resp = json!({"aggregations": {"by_agent": {"buckets": [{"key": "web1", "doc_count": 42}]}}});
        assert_eq!(classify_shape(&resp), ResponseShape::Aggregations);

        let bad = json!({"aggregations": {"by_agent": {"buckets": [{"key": "web1"}]}}});
        assert_eq!(classify_shape(&bad), ResponseShape::Unknown);

        let metric_only = json!({"aggregations": {"avg_level": {"value": 6.5}}});
        assert_eq!(classify_shape(&metric_only), ResponseShape::Unknown);
    }

    #[test]
    fn test_total_over_junk() {
        let junk = [
            json!(null),
            json!({}),
            json!([]),
            json!(42),
            json!("hits"),
            json!({"hits": null}),
            json!({"hits": {"total": "lots", "hits": [1, 2]}}),
            json!({"data": {"affected_items": "nope"}}),
            json!({"aggregations": [1, 2, 3]}),
            json!({"raw_data": {"raw_data": {"hits": {"hits": [[[]]]}}}}),
            json!([[{"rule": null}]]),
        ];
        for value in junk {
            assert_eq!(classify_shape(&value), ResponseShape::Unknown, "{}", value);
        }
    }

    #[test]
    fn test_forced_collection_is_lenient() {
        let resp = json!({"data": {"affected_items": [{"name": "no id"}, 5]}});
        assert_eq!(classify_shape(&resp), ResponseShape::Unknown);
        let items = collection_for(&resp, ResponseShape::AgentList).unwrap();
        assert_eq!(items.len(), 2);
    }
}
