//! Caption templates for WQC-OUT.
//!
//! Badge captions and notices are handlebars templates kept in a YAML file so
//! wording can change without touching the builder. The default set is
//! compiled in; a deployment may point at its own file.

use serde::Deserialize;
use std::collections::HashMap;

/// Compiled-in default templates
pub const EMBEDDED_TEMPLATES: &str = include_str!("../templates/presentation.yaml");

/// Top-level templates file structure
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
    #[serde(default)]
    pub example: Option<serde_json::Value>,
    #[serde(default)]
    pub output: Option<String>,
}

impl TemplatesFile {
    /// Load templates from a YAML file
    pub fn load(path: &str) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read templates file {}: {}", path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse templates from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str::<TemplatesFile>(yaml)
            .map_err(|e| format!("Failed to parse templates YAML: {}", e))
    }

    /// The compiled-in set
    pub fn embedded() -> Result<Self, String> {
        Self::from_yaml(EMBEDDED_TEMPLATES)
    }

    pub fn empty() -> Self {
        Self {
            version: "1.0".to_string(),
            templates: HashMap::new(),
        }
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }
}
