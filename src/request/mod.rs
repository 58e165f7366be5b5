//! Turns an inbound request body into a validated [`GenerateRequest`].

mod multipart;

pub use multipart::{read_form, FormFields};

use bytes::Bytes;
use log::debug;
use serde_json::Value;

use crate::error::ChopError;
use crate::extract::TextExtractor;
use crate::model::{parse_platforms, GenerateRequest};

/// A request as received from the transport layer
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub content_type: String,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        InboundRequest {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Convenience constructor for JSON bodies
    pub fn json(value: &Value) -> Self {
        InboundRequest::new("application/json", value.to_string())
    }
}

/// Raw platform tokens from a JSON value.
///
/// Arrays yield their elements, strings verbatim and anything else
/// stringified. Non-array values yield nothing.
pub fn tokens_from_json(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Raw platform tokens from a form field.
///
/// The field is parsed as JSON first; text that is not JSON is split on
/// commas instead.
pub fn tokens_from_form_field(field: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(field) {
        Ok(value) => tokens_from_json(&value),
        Err(_) => field.split(',').map(|p| p.trim().to_string()).collect(),
    }
}

/// Join the typed text with extracted attachment text, blank-line separated
pub fn merge_text(base: &str, extracted: &[String]) -> String {
    std::iter::once(base.trim())
        .chain(extracted.iter().map(|t| t.trim()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Normalize an inbound request.
///
/// # Errors
/// * `UnsupportedMediaType` for anything but multipart form data or JSON
/// * `MalformedRequest` when the body cannot be decoded
/// * `EmptyText` / `NoValidPlatforms` when validation fails
pub async fn normalize_request(
    request: &InboundRequest,
    extractor: &TextExtractor,
) -> Result<GenerateRequest, ChopError> {
    let content_type = request.content_type.to_lowercase();

    let (text, tokens) = if content_type.contains("multipart/form-data") {
        let form = read_form(&request.content_type, request.body.clone()).await?;
        let tokens = form
            .platforms
            .as_deref()
            .map(tokens_from_form_field)
            .unwrap_or_default();

        let base = form.text.unwrap_or_default();
        let text = if form.files.is_empty() {
            base.trim().to_string()
        } else {
            debug!("Extracting text from {} attachment(s)", form.files.len());
            let extracted = extractor.extract_all(&form.files).await;
            merge_text(&base, &extracted)
        };
        (text, tokens)
    } else if content_type.contains("application/json") {
        let body: Value = serde_json::from_slice(&request.body)
            .map_err(|e| ChopError::MalformedRequest(e.to_string()))?;
        let text = body
            .get("text")
            .and_then(Value::as_str)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        let tokens = body.get("platforms").map(tokens_from_json).unwrap_or_default();
        (text, tokens)
    } else {
        return Err(ChopError::UnsupportedMediaType(request.content_type.clone()));
    };

    GenerateRequest::new(&text, parse_platforms(&tokens))
}
