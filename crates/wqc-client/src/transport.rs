//! Backend transport.
//!
//! Non-2xx statuses and unparsable bodies both surface as
//! `ConsoleError::Transport`; they never become an empty result.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use wqc_core::ConsoleError;

#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body and parse the JSON reply
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ConsoleError>;

    /// GET a liveness path; any 2xx counts as up
    async fn check_health(&self, path: &str) -> Result<(), ConsoleError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConsoleError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ConsoleError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ConsoleError::transport(None, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ConsoleError::transport(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            ConsoleError::transport(Some(status.as_u16()), format!("Unparsable response body: {}", e))
        })
    }

    async fn check_health(&self, path: &str) -> Result<(), ConsoleError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ConsoleError::transport(None, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ConsoleError::transport(Some(status.as_u16()), format!("HTTP {}", status.as_u16())))
        }
    }
}

/// Error for a non-2xx reply: the body's `error` or `detail` text when the
/// backend sent one, else `HTTP <status>`.
pub fn error_from_body(status: u16, body: &str) -> ConsoleError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "detail"].iter().find_map(|key| match value.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Some(Value::Null) | None => None,
                Some(Value::String(_)) => None,
                Some(other) => Some(other.to_string()),
            })
        })
        .unwrap_or_else(|| format!("HTTP {}", status));
    ConsoleError::transport(Some(status), detail)
}
