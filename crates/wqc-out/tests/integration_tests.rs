//! Integration tests for wqc-out: backend payload in, display blocks out.
//!
//! Every test goes through `wqc_in::normalize` first so the blocks are
//! checked against what the console would really show.

use serde_json::{json, Value};
use wqc_core::{ResponseShape, Severity};
use wqc_out::{
    build, present, CardKind, ConfidenceTone, PresentationBlock, PresentationBuilder,
    PresentationConfig, RawSource, RecordCard,
};

fn blocks_for(resp: &Value) -> Vec<PresentationBlock> {
    build(&wqc_in::normalize(resp, 25))
}

fn kinds(blocks: &[PresentationBlock]) -> Vec<&'static str> {
    blocks.iter().map(|b| b.kind()).collect()
}

fn cards(blocks: &[PresentationBlock]) -> Vec<&RecordCard> {
    blocks
        .iter()
        .filter_map(|b| match b {
            PresentationBlock::RecordCard(card) => Some(card),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Record cards
// =============================================================================

#[test]
fn test_agent_card() {
    let blocks = blocks_for(&json!({
        "data": {"affected_items": [{"id": "001", "name": "srv1", "status": "Active", "ip": "10.0.0.1"}]}
    }));

    assert_eq!(kinds(&blocks), vec!["record_card", "raw_json", "raw_json"]);
    let cards = cards(&blocks);
    let card = cards[0];
    assert_eq!(card.kind, CardKind::Agent);
    assert_eq!(card.title, "srv1");
    assert_eq!(card.status.as_deref(), Some("active"));
    assert_eq!(card.field("ID"), Some("001"));
    assert_eq!(card.field("Status"), Some("Active"));
    assert_eq!(card.field("IP"), Some("10.0.0.1"));
    assert_eq!(card.field("OS"), Some("N/A"));
}

#[test]
fn test_search_hit_card_severity() {
    let result = wqc_in::normalize(
        &json!({
            "hits": {
                "total": {"value": 3},
                "hits": [{
                    "_source": {
                        "rule": {"level": 14, "description": "Brute force"},
                        "agent": {"name": "web1"},
                        "@timestamp": "2024-01-01T00:00:00Z"
                    }
                }]
            }
        }),
        25,
    );
    let presentation = present(&result);
    assert_eq!(presentation.total_count, 3);
    assert_eq!(presentation.shape, ResponseShape::SearchHits);

    let cards = cards(&presentation.blocks);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].severity, Some(Severity::Critical));
    let labels: Vec<&str> = cards[0].fields.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, vec!["Description", "Severity", "Agent", "Timestamp"]);
    assert_eq!(cards[0].field("Severity"), Some("Critical"));
}

#[test]
fn test_alert_cards_with_network_fields() {
    let blocks = blocks_for(&json!({
        "alerts": [
            {
                "rule": {"id": "5712", "level": 10, "description": "SSHD brute force"},
                "agent": {"name": "bastion"},
                "timestamp": "2024-03-02T10:00:00Z",
                "data": {"srcip": "198.51.100.4", "dstip": "10.0.0.5"}
            },
            {"rule": {"level": 3}}
        ]
    }));

    let cards = cards(&blocks);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].kind, CardKind::Alert);
    assert_eq!(cards[0].severity, Some(Severity::High));
    assert_eq!(cards[0].field("Source IP"), Some("198.51.100.4"));
    assert_eq!(cards[0].field("Dest IP"), Some("10.0.0.5"));

    assert_eq!(cards[1].title, "Unknown rule");
    assert_eq!(cards[1].severity, Some(Severity::Low));
    assert_eq!(cards[1].field("Agent"), Some("N/A"));
    assert_eq!(cards[1].field("Source IP"), None);
}

#[test]
fn test_aggregation_cards_keep_bucket_order() {
    let blocks = blocks_for(&json!({
        "aggregations": {"by_agent": {"buckets": [
            {"key": "web1", "doc_count": 42},
            {"key": "web2", "doc_count": 7}
        ]}}
    }));

    let titles: Vec<&str> = cards(&blocks).iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["web1", "web2"]);
    assert_eq!(cards(&blocks)[0].field("Count"), Some("42"));
    assert_eq!(cards(&blocks)[0].field("Aggregation"), Some("by_agent"));
}

// =============================================================================
// Routing, narrative, notices
// =============================================================================

#[test]
fn test_routing_only_response() {
    let blocks = blocks_for(&json!({
        "routing": {"pipeline": "ADVANCED_PIPELINE", "confidence": 0.92, "reasoning": "numeric filter detected"}
    }));

    assert_eq!(kinds(&blocks), vec!["badge", "empty_notice", "raw_json", "raw_json"]);
    let PresentationBlock::Badge(badge) = &blocks[0] else {
        panic!("expected badge first");
    };
    assert_eq!(badge.label, "Advanced");
    assert_eq!(badge.confidence_percent, 92);
    assert_eq!(badge.tone, ConfidenceTone::High);
    assert_eq!(badge.caption, "Advanced · Confidence: 92%");
    assert_eq!(badge.reasoning, "numeric filter detected");
}

#[test]
fn test_full_hybrid_response_order() {
    let blocks = blocks_for(&json!({
        "success": true,
        "routing": {"pipeline": "HYBRID_NL_DSL", "confidence": 0.75, "reasoning": "embedded DSL"},
        "formatted_response": "## Findings\n- **2** alerts on `web1`",
        "embedded_dsl": {"query": {"match_all": {}}},
        "raw_results": {"alerts": [
            {"rule": {"level": 12, "description": "a"}},
            {"rule": {"level": 7, "description": "b"}}
        ]}
    }));

    assert_eq!(
        kinds(&blocks),
        vec!["badge", "narrative_text", "record_card", "record_card", "raw_json", "raw_json"]
    );

    let PresentationBlock::Badge(badge) = &blocks[0] else {
        panic!("expected badge");
    };
    assert_eq!(badge.tone, ConfidenceTone::Medium);

    let PresentationBlock::NarrativeText { html } = &blocks[1] else {
        panic!("expected narrative");
    };
    assert_eq!(
        html.to_html(),
        "<h2>Findings</h2><ul><li><strong>2</strong> alerts on <code>web1</code></li></ul>"
    );

    let PresentationBlock::RawJson(dsl) = &blocks[5] else {
        panic!("expected dsl block");
    };
    assert_eq!(dsl.source, RawSource::Dsl);
    assert!(dsl.json.as_deref().unwrap_or_default().contains("match_all"));
}

#[test]
fn test_response_string_is_the_narrative() {
    let blocks = blocks_for(&json!({
        "dsl": {"size": 5},
        "raw_data": {"hits": {"total": {"value": 0}, "hits": []}},
        "response": "No critical alerts were found."
    }));

    assert_eq!(kinds(&blocks), vec!["narrative_text", "raw_json", "raw_json"]);
    let PresentationBlock::NarrativeText { html } = &blocks[0] else {
        panic!("expected narrative");
    };
    assert_eq!(html.to_html(), "<p>No critical alerts were found.</p>");
}

#[test]
fn test_unrecognised_routing_tag_still_badged() {
    let blocks = blocks_for(&json!({
        "routing": {"pipeline": "KEYWORD_PIPELINE", "confidence": 0.55, "reasoning": "fallback"}
    }));

    let PresentationBlock::Badge(badge) = &blocks[0] else {
        panic!("expected badge first");
    };
    assert_eq!(badge.label, "Advanced");
    assert_eq!(badge.confidence_percent, 55);
    assert_eq!(badge.tone, ConfidenceTone::Low);
    assert_eq!(badge.reasoning, "fallback");
}

#[test]
fn test_narrative_is_escaped() {
    let blocks = blocks_for(&json!({"summary": "<img src=x onerror=alert(1)>"}));
    let PresentationBlock::NarrativeText { html } = &blocks[0] else {
        panic!("expected narrative");
    };
    assert_eq!(html.to_html(), "<p>&lt;img src=x onerror=alert(1)&gt;</p>");
}

#[test]
fn test_raw_response_block_always_present() {
    for resp in [json!(null), json!({}), json!([1, 2]), json!({"summary": "hi"})] {
        let blocks = blocks_for(&resp);
        let raw = blocks.iter().find_map(|b| match b {
            PresentationBlock::RawJson(raw) if raw.source == RawSource::Response => Some(raw),
            _ => None,
        });
        let raw = raw.expect("raw response block");
        let parsed: Value = serde_json::from_str(raw.json.as_deref().unwrap()).unwrap();
        assert_eq!(parsed, resp);
    }
}

// =============================================================================
// Determinism and configuration
// =============================================================================

#[test]
fn test_identical_input_identical_blocks() {
    let resp = json!({
        "pipeline": "DIRECT_DSL",
        "query_time": "0.12s",
        "raw_data": {"hits": {"total": {"value": 1}, "hits": [{"_id": "x", "_source": {"rule": {"level": 8}}}]}},
        "dsl": {"size": 1}
    });
    let result = wqc_in::normalize(&resp, 400);

    let first = present(&result);
    let second = present(&result);
    assert_eq!(first, second);
    assert_eq!(first.digest(), second.digest());
    assert_eq!(first.elapsed_ms, 120);
    assert_eq!(
        serde_json::to_string(&first.blocks).unwrap(),
        serde_json::to_string(&second.blocks).unwrap()
    );
}

#[test]
fn test_serialized_block_tags() {
    let blocks = blocks_for(&json!({"routing": {"pipeline": "SIMPLE_PIPELINE", "confidence": 0.4, "reasoning": "r"}}));
    let value = serde_json::to_value(&blocks).unwrap();
    assert_eq!(value[0]["type"], "badge");
    assert_eq!(value[0]["tone"], "low");
    assert_eq!(value[1]["type"], "empty_notice");
    assert_eq!(value[3]["source"], "dsl");
    assert_eq!(value[3]["notice"], "No DSL query (Simple API call)");
}

#[test]
fn test_custom_templates_file() {
    let dir = std::env::temp_dir().join(format!("wqc-out-templates-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("presentation.yaml");
    std::fs::write(
        &path,
        r#"
version: "1.1"
templates:
  badge_caption:
    description: Terse caption
    template: "{{label}} ({{percent confidence}})"
"#,
    )
    .unwrap();

    let builder = PresentationBuilder::new(PresentationConfig {
        templates_path: Some(path.to_string_lossy().to_string()),
        ..Default::default()
    })
    .unwrap();

    let result = wqc_in::normalize(
        &json!({"routing": {"pipeline": "ADVANCED_PIPELINE", "confidence": 0.5, "reasoning": "r"}}),
        1,
    );
    let blocks = builder.build(&result);
    let PresentationBlock::Badge(badge) = &blocks[0] else {
        panic!("expected badge");
    };
    assert_eq!(badge.caption, "Advanced (50%)");

    // Templates the file leaves out fall back to built-in wording.
    let PresentationBlock::EmptyNotice { message } = &blocks[1] else {
        panic!("expected empty notice");
    };
    assert_eq!(message, "No formatted data available");

    std::fs::remove_dir_all(&dir).ok();
}
