//! Shape repair and parsing for generated JSON payloads.
//!
//! Models often wrap JSON in Markdown fences or a sentence of preamble.
//! Repair only locates the first complete object; it never fills in content.

use serde::de::DeserializeOwned;
use serde_json::{Deserializer, Value};

use crate::error::{InterviewError, Result};

/// Slice of `raw` holding the first complete JSON object, if any.
///
/// Each `{` is tried in turn, so braces in surrounding prose are skipped and
/// text after the object is ignored.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    raw.match_indices('{').find_map(|(start, _)| {
        let mut stream = Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(_))) => Some(&raw[start..start + stream.byte_offset()]),
            _ => None,
        }
    })
}

/// Locate and deserialize the JSON object in a generated response.
pub fn parse_generated<T: DeserializeOwned>(raw: &str, what: &'static str) -> Result<T> {
    let body = extract_json_object(raw)
        .ok_or_else(|| InterviewError::shape(what, "response contains no JSON object"))?;
    serde_json::from_str(body).map_err(|e| InterviewError::shape(what, e.to_string()))
}

/// Collapse internal whitespace runs and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
