//! Defensive handling of provider output.
//!
//! Providers are asked for JSON only, but regularly wrap it in Markdown
//! fences, leave trailing commas, or return fields with the wrong shape.
//! Nothing here trusts the provider schema: content is parsed into an
//! untyped [`Value`] and each entry is coerced per platform into an
//! optional [`GenerateResult`].

use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::model::{GenerateResult, Platform};

static RE_OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(?:json)?\n?").expect("valid regex"));
static RE_CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```$").expect("valid regex"));
static RE_TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("valid regex"));

/// Parse model output that is supposed to be JSON.
///
/// Strips a surrounding Markdown code fence and trailing commas before
/// parsing. Returns `None` when the cleaned text is still not JSON.
pub fn parse_lenient_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let unfenced = RE_OPENING_FENCE.replace(trimmed, "");
    let unfenced = RE_CLOSING_FENCE.replace(&unfenced, "");
    let cleaned = RE_TRAILING_COMMA.replace_all(&unfenced, "$1");

    match serde_json::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("lenient JSON parse failed: {}", e);
            None
        }
    }
}

/// Coerce a loosely-typed field into text.
///
/// Strings pass through, arrays are joined with spaces, objects carrying a
/// string `content` are unwrapped, and anything else is stringified.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(coerce_text).collect::<Vec<_>>().join(" "),
        Value::Object(map) => match map.get("content") {
            Some(Value::String(content)) => content.clone(),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Validate raw provider entries against the requested platforms.
///
/// Non-objects, unrequested platforms and entries missing required fields
/// are dropped. Output keeps input order and the first valid entry per
/// platform.
pub fn normalize_results(raw: &[Value], requested: &[Platform]) -> Vec<GenerateResult> {
    let mut results: Vec<GenerateResult> = Vec::new();

    for entry in raw {
        let Some(item) = entry.as_object() else {
            continue;
        };
        let Some(platform) = item
            .get("platform")
            .and_then(Value::as_str)
            .and_then(|p| p.parse::<Platform>().ok())
        else {
            continue;
        };
        if !requested.contains(&platform) || results.iter().any(|r| r.platform() == platform) {
            continue;
        }

        match coerce_entry(platform, item) {
            Some(result) => results.push(result),
            None => debug!("dropping malformed {} result", platform),
        }
    }

    results
}

fn required(item: &Map<String, Value>, field: &str) -> Option<String> {
    let text = item.get(field).map(coerce_text).unwrap_or_default();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn coerce_entry(platform: Platform, item: &Map<String, Value>) -> Option<GenerateResult> {
    match platform {
        Platform::Twitter => {
            let threads: Vec<String> = item
                .get("threads")
                .and_then(Value::as_array)?
                .iter()
                .map(coerce_text)
                .filter(|t| !t.trim().is_empty())
                .collect();
            if threads.is_empty() {
                None
            } else {
                Some(GenerateResult::Twitter { threads })
            }
        }
        Platform::Linkedin => Some(GenerateResult::Linkedin {
            post: required(item, "post")?,
        }),
        Platform::Reddit => Some(GenerateResult::Reddit {
            title: required(item, "title")?,
            post: required(item, "post")?,
        }),
        Platform::Youtube => Some(GenerateResult::Youtube {
            script: required(item, "script")?,
        }),
        Platform::Telegram => Some(GenerateResult::Telegram {
            post: required(item, "post")?,
        }),
    }
}
