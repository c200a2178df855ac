use crate::config::ProxyMode;
use crate::error::{ProxyError, Result};
use crate::logging::{LogLevel, SharedLogger};
use crate::translate::legacy_types::LegacyResponse;
use crate::translate::{classify, legacy_to_target, target_to_legacy, InboundRequest};
use crate::upstream::{Upstream, UpstreamReply};

use serde_json::Value;

/// Outcome of relaying one request.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Upstream reply handed back unchanged.
    Raw(UpstreamReply),
    /// Upstream reply translated back into the legacy shape.
    Legacy { status: u16, body: LegacyResponse },
}

impl RelayOutcome {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Raw(reply) => reply.status,
            Self::Legacy { status, .. } => *status,
        }
    }
}

/// Decode the raw request body. An empty body stands for `{}`; anything else
/// must be valid JSON. Invalid UTF-8 is replaced rather than rejected.
pub fn parse_body(raw: &[u8]) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    let text = String::from_utf8_lossy(raw);
    serde_json::from_str(&text).map_err(|e| ProxyError::invalid_body(e.to_string()))
}

/// Parse, classify, translate, call upstream, translate back.
///
/// In passthrough mode classification is skipped and every body is treated as
/// already being in Responses shape.
pub async fn relay(
    raw: &[u8],
    mode: ProxyMode,
    upstream: &Upstream,
    logger: &SharedLogger,
) -> Result<RelayOutcome> {
    let body = parse_body(raw)?;

    let inbound = match mode {
        ProxyMode::Translate => classify(body),
        ProxyMode::Passthrough => InboundRequest::Target(body),
    };

    match inbound {
        InboundRequest::Target(body) => {
            logger.info(
                "proxy",
                format!("Request: dialect=target model={}", model_label(body.get("model"))),
            );
            let reply = call_upstream(upstream, &body, logger).await?;
            Ok(RelayOutcome::Raw(reply))
        }
        InboundRequest::Legacy(req) => {
            logger.info(
                "proxy",
                format!(
                    "Request: dialect=legacy model={} messages={}",
                    model_label(req.model.as_ref()),
                    req.messages.len()
                ),
            );
            let target = legacy_to_target(&req);
            let reply = call_upstream(upstream, &target, logger).await?;

            let resp: Value = serde_json::from_slice(&reply.body).map_err(|e| {
                ProxyError::upstream(format!(
                    "Upstream returned non-JSON body (status {}): {}",
                    reply.status, e
                ))
            })?;

            Ok(RelayOutcome::Legacy {
                status: reply.status,
                body: target_to_legacy(&resp),
            })
        }
    }
}

async fn call_upstream<T: serde::Serialize + ?Sized>(
    upstream: &Upstream,
    body: &T,
    logger: &SharedLogger,
) -> Result<UpstreamReply> {
    logger.debug("proxy", format!("POST {}", upstream.url()));

    let reply = upstream.invoke(body).await?;

    if reply.status >= 400 {
        logger.warn(
            "proxy",
            format!(
                "Upstream response status={} body_len={}",
                reply.status,
                reply.body.len()
            ),
        );
    } else {
        logger.log_with_context(
            LogLevel::Info,
            "proxy",
            format!("Upstream response status={}", reply.status),
            serde_json::json!({ "status": reply.status, "body_len": reply.body.len() }),
        );
    }

    Ok(reply)
}

fn model_label(model: Option<&Value>) -> String {
    match model {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}
