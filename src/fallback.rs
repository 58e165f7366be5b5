//! Deterministic, template-based post generation.
//!
//! Used when no provider is configured, when every provider fails, and to
//! fill platforms a provider left out. Never fails.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{GenerateResult, Platform};

const PREVIEW_CHARS: usize = 280;

static RE_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("valid regex"));
static RE_UPDATE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^update\s*\d*:?[\s-]*").expect("valid regex"));

/// First `n` characters of `s`, never splitting a character.
pub(crate) fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Keep the base text and only the latest revision note.
///
/// Heuristic: the text is split into blank-line separated chunks. A chunk
/// starting with `update`, optionally followed by a number, colon or dash,
/// is a revision note and loses its marker. The first other chunk is the
/// base; later chunks count as revisions too. The result is the base plus
/// the last non-empty revision, joined by a space.
///
/// Any paragraph that happens to start with the word "update" (or
/// "updated", "updates") is treated as a revision note.
pub fn collapse_updates(raw: &str) -> String {
    let mut base: Option<&str> = None;
    let mut latest: Option<&str> = None;

    for chunk in RE_BLANK_LINES.split(raw).map(str::trim) {
        if chunk.is_empty() {
            continue;
        }
        if let Some(marker) = RE_UPDATE_MARKER.find(chunk) {
            let note = chunk[marker.end()..].trim();
            if !note.is_empty() {
                latest = Some(note);
            }
        } else if base.is_none() {
            base = Some(chunk);
        } else {
            latest = Some(chunk);
        }
    }

    match (base, latest) {
        (Some(base), Some(latest)) => format!("{} {}", base, latest),
        (None, Some(latest)) => latest.to_string(),
        (Some(base), None) => base.to_string(),
        (None, None) => String::new(),
    }
}

/// Short excerpt used by every template.
pub fn preview(collapsed: &str) -> String {
    let head = take_chars(collapsed, PREVIEW_CHARS).trim();
    if collapsed.chars().count() > PREVIEW_CHARS {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

/// Build one templated post per requested platform, in request order.
pub fn fallback_generate(text: &str, platforms: &[Platform]) -> Vec<GenerateResult> {
    let collapsed = collapse_updates(text);
    let preview = preview(&collapsed);

    platforms
        .iter()
        .map(|platform| template(*platform, &collapsed, &preview))
        .collect()
}

fn template(platform: Platform, collapsed: &str, preview: &str) -> GenerateResult {
    match platform {
        Platform::Twitter => GenerateResult::Twitter {
            threads: vec![
                format!("🧵 {}", preview),
                "Key insight #1 from the content ↓".to_string(),
                "Key insight #2 → why it matters".to_string(),
                "What do you think? Reply below! 👇".to_string(),
            ],
        },
        Platform::Linkedin => GenerateResult::Linkedin {
            post: format!(
                "Excited to share this:\n\n{}\n\nWould love to hear your thoughts in the comments — what's your take?",
                preview
            ),
        },
        Platform::Reddit => GenerateResult::Reddit {
            title: format!(
                "What are your thoughts on: {}...?",
                take_chars(preview, 100)
            ),
            post: format!(
                "{}\n\nCurious to read the community's perspective!",
                take_chars(collapsed, 1800)
            ),
        },
        Platform::Youtube => GenerateResult::Youtube {
            script: format!(
                "0:00 - Intro: Welcome! Today we're diving into {}...\n1:20 - Main point 1\n2:45 - Main point 2\n...\nOutro: Like & subscribe!",
                take_chars(preview, 60)
            ),
        },
        Platform::Telegram => GenerateResult::Telegram {
            post: format!(
                "{}\n\nFull details: {}",
                preview,
                take_chars(collapsed, 800)
            ),
        },
    }
}
