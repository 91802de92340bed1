//! Presentation builder: CanonicalResult -> ordered PresentationBlock list.
//!
//! Block order is fixed: routing badge, narrative, record cards (or a single
//! empty notice), raw response, then the DSL view. The builder holds only
//! configuration and compiled caption templates, so the same input always
//! yields the same blocks.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wqc_core::{
    AgentRecord, AlertRecord, BucketRecord, CanonicalResult, ClassifiedRecord, Pipeline,
    ResponseShape, RoutingDecision, SearchHitRecord, NOT_AVAILABLE,
};

use crate::blocks::{
    CardField, CardKind, ConfidenceTone, PresentationBlock, RawJsonBlock, RawSource, RecordCard,
    RoutingBadge,
};
use crate::markdown::render_markdown;
use crate::renderer::TemplateRenderer;
use crate::templates::TemplatesFile;
use crate::PresentError;

/// Title for entries the extractor could not type
pub const UNRECOGNIZED_TITLE: &str = "Unrecognized entry";

/// Presentation policy. Confidence thresholds are inclusive lower bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub high_confidence: f64,
    pub medium_confidence: f64,
    /// Caption templates file; the embedded set is used when unset
    pub templates_path: Option<String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            high_confidence: 0.90,
            medium_confidence: 0.70,
            templates_path: None,
        }
    }
}

impl PresentationConfig {
    pub fn tone(&self, confidence: f64) -> ConfidenceTone {
        if confidence >= self.high_confidence {
            ConfidenceTone::High
        } else if confidence >= self.medium_confidence {
            ConfidenceTone::Medium
        } else {
            ConfidenceTone::Low
        }
    }

    fn validate(&self) -> Result<(), PresentError> {
        let in_range = |t: f64| (0.0..=1.0).contains(&t);
        if !in_range(self.high_confidence) || !in_range(self.medium_confidence) {
            return Err(PresentError::Config(
                "confidence thresholds must lie within [0, 1]".to_string(),
            ));
        }
        if self.medium_confidence > self.high_confidence {
            return Err(PresentError::Config(format!(
                "medium threshold {} exceeds high threshold {}",
                self.medium_confidence, self.high_confidence
            )));
        }
        Ok(())
    }
}

/// Display model for one query cycle: stats header plus blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub total_count: u64,
    pub elapsed_ms: u64,
    pub shape: ResponseShape,
    pub blocks: Vec<PresentationBlock>,
}

impl Presentation {
    /// Content hash of the block sequence, for golden-output checks
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(&self.blocks).unwrap_or_default();
        format!("blake3:{}", blake3::hash(&bytes))
    }
}

pub struct PresentationBuilder {
    config: PresentationConfig,
    renderer: TemplateRenderer,
}

impl PresentationBuilder {
    pub fn new(config: PresentationConfig) -> Result<Self, PresentError> {
        config.validate()?;
        let templates = match config.templates_path.as_deref() {
            Some(path) => TemplatesFile::load(path),
            None => TemplatesFile::embedded(),
        }
        .map_err(PresentError::Template)?;

        Ok(Self {
            config,
            renderer: TemplateRenderer::new(templates),
        })
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    pub fn build(&self, result: &CanonicalResult) -> Vec<PresentationBlock> {
        let mut blocks = Vec::with_capacity(result.records.len() + 4);

        if let Some(routing) = &result.routing {
            blocks.push(PresentationBlock::Badge(self.badge(routing)));
        }

        let html = render_markdown(result.narrative.as_deref());
        let has_narrative = !html.is_empty();
        if has_narrative {
            blocks.push(PresentationBlock::NarrativeText { html });
        }

        if result.records.is_empty() {
            if !has_narrative {
                let message = self.renderer.render_or(
                    "empty_notice",
                    &json!({ "total": result.total_count }),
                    || "No formatted data available".to_string(),
                );
                blocks.push(PresentationBlock::EmptyNotice { message });
            }
        } else {
            blocks.extend(
                result
                    .records
                    .iter()
                    .enumerate()
                    .map(|(i, record)| PresentationBlock::RecordCard(self.card(i, record))),
            );
        }

        blocks.push(PresentationBlock::RawJson(RawJsonBlock {
            source: RawSource::Response,
            json: Some(pretty(&result.raw)),
            notice: None,
        }));
        blocks.push(PresentationBlock::RawJson(self.dsl_block(result)));

        tracing::debug!(
            shape = %result.shape,
            records = result.records.len(),
            blocks = blocks.len(),
            "built presentation"
        );
        blocks
    }

    pub fn present(&self, result: &CanonicalResult) -> Presentation {
        Presentation {
            total_count: result.total_count,
            elapsed_ms: result.elapsed_ms,
            shape: result.shape,
            blocks: self.build(result),
        }
    }

    fn badge(&self, routing: &RoutingDecision) -> RoutingBadge {
        let label = routing.pipeline.label();
        let caption = self.renderer.render_or(
            "badge_caption",
            &json!({ "label": label, "confidence": routing.confidence }),
            || format!("{} · Confidence: {}%", label, routing.confidence_percent()),
        );
        RoutingBadge {
            pipeline: routing.pipeline,
            label: label.to_string(),
            confidence_percent: routing.confidence_percent(),
            tone: self.config.tone(routing.confidence),
            reasoning: routing.reasoning.clone(),
            caption,
        }
    }

    fn dsl_block(&self, result: &CanonicalResult) -> RawJsonBlock {
        if let Some(dsl) = &result.dsl {
            return RawJsonBlock {
                source: RawSource::Dsl,
                json: Some(pretty(dsl)),
                notice: None,
            };
        }

        let reason = match result.routing.as_ref().map(|r| r.pipeline) {
            None | Some(Pipeline::Simple) => Value::Null,
            Some(pipeline) => json!(format!("{} pipeline", pipeline.label())),
        };
        let notice = self.renderer.render_or(
            "no_dsl_notice",
            &json!({ "reason": reason }),
            || "No DSL query".to_string(),
        );
        RawJsonBlock {
            source: RawSource::Dsl,
            json: None,
            notice: Some(notice),
        }
    }

    fn card(&self, index: usize, record: &ClassifiedRecord) -> RecordCard {
        match record {
            ClassifiedRecord::Agent(agent) => agent_card(agent),
            ClassifiedRecord::Alert(alert) => alert_card(alert),
            ClassifiedRecord::SearchHit(hit) => search_hit_card(index, hit),
            ClassifiedRecord::AggregationBucket(bucket) => bucket_card(bucket),
            ClassifiedRecord::Unknown(value) => self.unknown_card(value),
        }
    }

    fn unknown_card(&self, value: &Value) -> RecordCard {
        let compact = value.to_string();
        let text = self.renderer.render_or(
            "unknown_entry",
            &json!({ "value": &compact }),
            || compact.clone(),
        );
        RecordCard {
            kind: CardKind::Unknown,
            title: UNRECOGNIZED_TITLE.to_string(),
            severity: None,
            status: None,
            fields: vec![CardField::new("Value", text)],
        }
    }
}

impl Default for PresentationBuilder {
    /// Default thresholds and the embedded templates. Falls back to
    /// built-in wording if the embedded set fails to parse.
    fn default() -> Self {
        let config = PresentationConfig::default();
        let templates = TemplatesFile::embedded().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "embedded templates unusable");
            TemplatesFile::empty()
        });
        Self {
            config,
            renderer: TemplateRenderer::new(templates),
        }
    }
}

static DEFAULT_BUILDER: Lazy<PresentationBuilder> = Lazy::new(PresentationBuilder::default);

/// Build blocks with the default policy
pub fn build(result: &CanonicalResult) -> Vec<PresentationBlock> {
    DEFAULT_BUILDER.build(result)
}

/// Build the full presentation with the default policy
pub fn present(result: &CanonicalResult) -> Presentation {
    DEFAULT_BUILDER.present(result)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn agent_card(agent: &AgentRecord) -> RecordCard {
    RecordCard {
        kind: CardKind::Agent,
        title: agent.name.clone(),
        severity: None,
        status: Some(agent.status.to_lowercase()),
        fields: vec![
            CardField::new("ID", agent.id.as_str()),
            CardField::new("Status", agent.status.as_str()),
            CardField::new("IP", agent.ip.as_str()),
            CardField::new("OS", agent.os.as_str()),
            CardField::new("Last Keep Alive", agent.last_keep_alive.as_str()),
        ],
    }
}

fn alert_card(alert: &AlertRecord) -> RecordCard {
    let level = alert
        .level
        .map(|l| l.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut fields = vec![
        CardField::new("Rule ID", alert.rule_id.as_str()),
        CardField::new("Level", level),
        CardField::new("Severity", alert.severity.to_string()),
        CardField::new("Agent", alert.agent_name.as_str()),
        CardField::new("Timestamp", alert.timestamp.as_str()),
    ];
    if let Some(ip) = &alert.source_ip {
        fields.push(CardField::new("Source IP", ip.as_str()));
    }
    if let Some(ip) = &alert.dest_ip {
        fields.push(CardField::new("Dest IP", ip.as_str()));
    }

    RecordCard {
        kind: CardKind::Alert,
        title: alert.description.clone(),
        severity: Some(alert.severity),
        status: None,
        fields,
    }
}

fn search_hit_card(index: usize, hit: &SearchHitRecord) -> RecordCard {
    let title = hit
        .id
        .clone()
        .unwrap_or_else(|| format!("Hit {}", index + 1));

    let fields = [
        ("Description", hit.description.clone()),
        ("Severity", hit.severity.map(|s| s.to_string())),
        ("Agent", hit.agent_name.clone()),
        ("Timestamp", hit.timestamp.clone()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| CardField::new(label, v)))
    .collect();

    RecordCard {
        kind: CardKind::SearchHit,
        title,
        severity: hit.severity,
        status: None,
        fields,
    }
}

fn bucket_card(bucket: &BucketRecord) -> RecordCard {
    RecordCard {
        kind: CardKind::AggregationBucket,
        title: bucket.key.clone(),
        severity: None,
        status: None,
        fields: vec![
            CardField::new("Aggregation", bucket.aggregation.as_str()),
            CardField::new("Count", bucket.doc_count.to_string()),
        ],
    }
}
