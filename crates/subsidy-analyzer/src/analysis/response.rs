use serde_json::{Map, Value};

use crate::analysis::schema::StructuredResult;

/// Key under which unparseable model output is kept for inspection.
pub const RAW_RESPONSE_KEY: &str = "raw_response";

/// How a completion was interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// JSON found and it matches [`StructuredResult`].
    Structured(Box<StructuredResult>),
    /// JSON object found but it does not match the result shape.
    Unstructured(Map<String, Value>),
    /// No JSON object could be recovered; carries the raw text.
    NoJson(String),
}

/// Greedy span from the first `{` to the last `}`, inclusive.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Recovers a JSON object from free text. A span that does not parse, or
/// that parses to something other than an object, counts as no JSON.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let span = extract_json_span(text)?;
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

pub fn parse_response(text: &str) -> ParsedResponse {
    let Some(object) = extract_json_object(text) else {
        return ParsedResponse::NoJson(text.to_string());
    };

    let value = Value::Object(object);
    match StructuredResult::from_json(&value) {
        Ok(result) => ParsedResponse::Structured(Box::new(result)),
        Err(e) => {
            tracing::warn!(error = %e, "Model output does not match the result shape");
            match value {
                Value::Object(object) => ParsedResponse::Unstructured(object),
                _ => ParsedResponse::NoJson(text.to_string()),
            }
        }
    }
}

/// Diagnostic payload stored when no JSON could be recovered.
pub fn raw_response_payload(text: &str) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert(RAW_RESPONSE_KEY.to_string(), Value::String(text.to_string()));
    payload
}
