//! Responses API request shapes.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    pub input: Vec<Value>,
    #[serde(flatten)]
    pub output: OutputSpec,
}

/// How the upstream should shape its output. Exactly one of `output_format`
/// or `text` ends up in the serialized request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSpec {
    OutputFormat(OutputFormat),
    Text(TextOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: Value,
}

impl OutputFormat {
    pub fn json_schema(schema: Value) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOptions {
    pub format: TextFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl TextOptions {
    #[must_use]
    pub fn plain() -> Self {
        Self {
            format: TextFormat {
                format_type: "text".to_string(),
            },
        }
    }
}
