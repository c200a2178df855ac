//! Error types for the proxy.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ProxyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream {
            message: msg.into(),
        }
    }

    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody {
            message: msg.into(),
        }
    }

    /// The body returned to callers for any failure, whatever its origin.
    #[must_use]
    pub fn failure_body(&self) -> FailureBody {
        FailureBody::proxy_failed(self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Fixed-shape error body: `{"error": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FailureBody {
    pub fn proxy_failed(message: impl Into<String>) -> Self {
        Self {
            error: "proxy_failed",
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self {
            error: "method_not_allowed",
            message: None,
        }
    }
}
