//! Translate a Chat Completions style request into a Responses request.
//!
//! `model` and `messages` are copied as-is: nothing is validated here, the
//! upstream is the one to reject bad input. Only a well-formed `json_schema`
//! response format survives; anything else asks for plain text.

use serde_json::Value;

use super::legacy_types::LegacyRequest;
use super::target_types::{OutputFormat, OutputSpec, TargetRequest, TextOptions};

/// Pure function: the legacy request in, the Responses request out.
#[must_use]
pub fn legacy_to_target(req: &LegacyRequest) -> TargetRequest {
    let output = match json_schema_of(req.response_format.as_ref()) {
        Some(schema) => OutputSpec::OutputFormat(OutputFormat::json_schema(schema.clone())),
        None => OutputSpec::Text(TextOptions::plain()),
    };

    TargetRequest {
        model: req.model.clone(),
        input: req.messages.clone(),
        output,
    }
}

/// The schema of a `{"type": "json_schema", "json_schema": {...}}` response
/// format. A wrong type or a missing/null schema yields `None`.
fn json_schema_of(response_format: Option<&Value>) -> Option<&Value> {
    let rf = response_format?.as_object()?;
    if rf.get("type").and_then(Value::as_str) != Some("json_schema") {
        return None;
    }
    rf.get("json_schema").filter(|schema| !schema.is_null())
}
