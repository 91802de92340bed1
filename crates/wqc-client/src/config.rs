//! Console configuration: YAML file plus environment overrides.
//!
//! Resolution order is defaults, then the file named by `WQC_CONFIG`, then
//! `WQC_BACKEND_URL` / `WQC_ADDR`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wqc_core::ConsoleError;
use wqc_out::PresentationConfig;

use crate::request::EndpointLayout;

pub const ENV_CONFIG: &str = "WQC_CONFIG";
pub const ENV_BACKEND_URL: &str = "WQC_BACKEND_URL";
pub const ENV_ADDR: &str = "WQC_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Query backend base URL, no trailing slash
    pub backend_url: String,
    /// Address the API service binds
    pub listen_addr: String,
    pub layout: EndpointLayout,
    pub request_timeout_secs: u64,
    /// Overrides the layout's health poll interval
    pub health_interval_secs: Option<u64>,
    pub presentation: PresentationConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            listen_addr: "0.0.0.0:8080".to_string(),
            layout: EndpointLayout::default(),
            request_timeout_secs: 120,
            health_interval_secs: None,
            presentation: PresentationConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConsoleError> {
        serde_yaml::from_str(yaml).map_err(|e| ConsoleError::Config(format!("invalid config: {}", e)))
    }

    pub fn load(path: &str) -> Result<Self, ConsoleError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConsoleError::Config(format!("failed to read {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// Build from the process environment
    pub fn from_env() -> Result<Self, ConsoleError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Build from any variable lookup
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConsoleError> {
        let mut config = match lookup(ENV_CONFIG) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            config.backend_url = url;
        }
        if let Some(addr) = lookup(ENV_ADDR) {
            config.listen_addr = addr;
        }
        config.backend_url = config.backend_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn health_interval(&self) -> Duration {
        self.health_interval_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.layout.health_interval())
    }
}
