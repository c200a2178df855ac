//! Chat Completions style request and response shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fields of a legacy request that take part in translation.
///
/// `model` keeps an explicit JSON `null` distinct from an absent key, so the
/// value is forwarded exactly as the caller sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LegacyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

impl LegacyRequest {
    /// Pick the legacy fields out of a parsed body. A `messages` value that is
    /// missing or not an array becomes an empty list.
    #[must_use]
    pub fn from_map(body: &Map<String, Value>) -> Self {
        let messages = match body.get("messages") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        Self {
            model: body.get("model").cloned(),
            messages,
            response_format: body.get("response_format").cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyResponse {
    pub choices: Vec<LegacyChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyChoice {
    pub message: LegacyMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyMessage {
    pub content: Value,
}

impl LegacyResponse {
    /// A response carrying a single choice with the given content.
    pub fn single(content: impl Into<Value>) -> Self {
        Self {
            choices: vec![LegacyChoice {
                message: LegacyMessage {
                    content: content.into(),
                },
            }],
        }
    }
}
