//! The single outbound call to the Responses endpoint.
//!
//! The credential is supplied at construction; nothing here reads the
//! environment. One attempt per call, no retries.

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, Result};

use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Status, content type and raw body of an upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl fmt::Debug for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upstream")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Upstream {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client with the configured timeout.
    pub fn from_config(config: &UpstreamConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::new(client, config.url.clone(), api_key))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `body` as JSON and collect the whole reply. Any HTTP status is a
    /// successful call; only transport failures are errors.
    pub async fn invoke<T: Serialize + ?Sized>(&self, body: &T) -> Result<UpstreamReply> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProxyError::upstream(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::upstream(format!("Failed to read response body: {}", e)))?;

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let upstream = Upstream::new(reqwest::Client::new(), "http://localhost/v1/responses", "sk-secret");
        let debug = format!("{upstream:?}");
        assert!(debug.contains("http://localhost/v1/responses"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_from_config_uses_configured_url() {
        let config = UpstreamConfig {
            url: "http://127.0.0.1:1/v1/responses".to_string(),
            ..UpstreamConfig::default()
        };
        let upstream = Upstream::from_config(&config, "sk-test").unwrap();
        assert_eq!(upstream.url(), "http://127.0.0.1:1/v1/responses");
    }

    #[tokio::test]
    async fn test_connection_failure_is_upstream_error() {
        // Port 9 (discard) is not expected to accept connections.
        let upstream = Upstream::new(reqwest::Client::new(), "http://127.0.0.1:9/v1/responses", "sk");
        let err = upstream.invoke(&serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream { .. }));
    }
}
