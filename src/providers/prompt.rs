use crate::model::Platform;

/// The system prompt sent to the primary provider.
///
/// Loaded from `prompts/system.txt` at compile time using `include_str!`,
/// so the wording can be edited without dealing with Rust string syntax.
pub const SYSTEM_PROMPT: &str = include_str!("prompts/system.txt");

/// Longer system prompt with an explicit quality bar, used by the
/// secondary provider.
pub const DETAILED_SYSTEM_PROMPT: &str = include_str!("prompts/detailed.txt");

/// Formatting note for a single platform.
pub fn platform_guideline(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => "TWITTER/X: 1-7 tweets if needed. Massive hook up top, 280 chars max each, line breaks for rhythm, no emojis.",
        Platform::Linkedin => "LINKEDIN: Professional storytelling with edge. 3-4 line paragraphs, provocative opener, end with a thoughtful question.",
        Platform::Reddit => "REDDIT: Click-worthy title + value-dense body. Conversational, zero ad-speak.",
        Platform::Youtube => "YOUTUBE: High-retention script. 15-second hook, structured beats, keep momentum, stage directions optional.",
        Platform::Telegram => "TELEGRAM: Punchy bullets for a channel post. Bold key points. Ultra scannable.",
    }
}

/// Build the user prompt for a request.
///
/// The source text is embedded verbatim between `"""` delimiters, followed
/// by one formatting note per requested platform in request order.
pub fn build_user_prompt(source_text: &str, platforms: &[Platform]) -> String {
    let guidelines = platforms
        .iter()
        .map(|p| platform_guideline(*p))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"TASK: Turn the source into platform-native posts that feel authored by a sharp practitioner, not a marketer.

WHAT TO PULL OUT:
- Core thesis in one line.
- 3-6 non-obvious insights, tactics, or takeaways.
- Numbers, contrasts, or examples when present. If none, create crisp hypothetical examples.

SOURCE CONTENT:
"""
{source_text}
"""

SPECIFIC PLATFORM RULES:
{guidelines}

OUTPUT INSTRUCTION:
Return a JSON object containing a "results" array. Every object in the array MUST have a "platform" key matching the requested platform."#
    )
}
