//! Unified Error Model
//!
//! Only `Input` and `Transport` abort a query cycle. Shape fallback and
//! missing record fields degrade inside the result and are never errors.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    /// Empty query or malformed DSL. Raised before any request is sent.
    #[error("INPUT/{0}")]
    Input(String),

    /// Network failure, non-2xx status or unparsable response body.
    #[error("TRANSPORT/{detail}")]
    Transport { status: Option<u16>, detail: String },

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("SERIALIZE/{0}")]
    Serialize(String),
}

impl ConsoleError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn transport(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Transport {
            status,
            detail: detail.into(),
        }
    }

    /// Short machine-readable kind, used for metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Transport { .. } => "transport",
            Self::Config(_) => "config",
            Self::Serialize(_) => "serialize",
        }
    }

    /// Message without the category prefix, as shown to the user
    pub fn detail(&self) -> &str {
        match self {
            Self::Input(msg) | Self::Config(msg) | Self::Serialize(msg) => msg,
            Self::Transport { detail, .. } => detail,
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}
