//! Presentation blocks: the render-agnostic units handed to a view layer.

use serde::Serialize;
use wqc_core::{Pipeline, Severity};

use crate::markdown::SafeHtml;

/// One renderable unit, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresentationBlock {
    Badge(RoutingBadge),
    NarrativeText { html: SafeHtml },
    RecordCard(RecordCard),
    RawJson(RawJsonBlock),
    EmptyNotice { message: String },
}

impl PresentationBlock {
    /// Block tag as serialized
    pub fn kind(&self) -> &'static str {
        match self {
            PresentationBlock::Badge(_) => "badge",
            PresentationBlock::NarrativeText { .. } => "narrative_text",
            PresentationBlock::RecordCard(_) => "record_card",
            PresentationBlock::RawJson(_) => "raw_json",
            PresentationBlock::EmptyNotice { .. } => "empty_notice",
        }
    }
}

/// Colour band for the confidence badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTone {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingBadge {
    pub pipeline: Pipeline,
    pub label: String,
    pub confidence_percent: u8,
    pub tone: ConfidenceTone,
    pub reasoning: String,
    pub caption: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Agent,
    Alert,
    SearchHit,
    AggregationBucket,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardField {
    pub label: String,
    pub value: String,
}

impl CardField {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordCard {
    pub kind: CardKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Agent connection status, lowercased for styling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub fields: Vec<CardField>,
}

impl RecordCard {
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RawSource {
    Response,
    Dsl,
}

/// Pretty JSON view. The DSL block carries `notice` instead of `json` when
/// no DSL was echoed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawJsonBlock {
    pub source: RawSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}
