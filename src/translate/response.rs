//! Translate a Responses API body back into the Chat Completions shape.

use serde_json::Value;

use super::legacy_types::LegacyResponse;

/// Translate a Responses API body into a single-choice legacy response.
/// Pure function: extra outputs beyond the first are dropped.
#[must_use]
pub fn target_to_legacy(resp: &Value) -> LegacyResponse {
    LegacyResponse::single(output_text(resp))
}

/// `output[0].content[0].text`, else `output_text`, else `""`.
/// Only absent or null values fall through; an empty string is kept.
#[must_use]
pub fn output_text(resp: &Value) -> Value {
    let first_part = resp
        .get("output")
        .and_then(|o| o.get(0))
        .and_then(|item| item.get("content"))
        .and_then(|c| c.get(0))
        .and_then(|part| part.get("text"));

    first_part
        .filter(|v| !v.is_null())
        .or_else(|| resp.get("output_text").filter(|v| !v.is_null()))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}
