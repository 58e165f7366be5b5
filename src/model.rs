use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChopError;

/// A supported social destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
    Reddit,
    Youtube,
    Telegram,
}

impl Platform {
    /// Every platform, in canonical order
    pub const ALL: [Platform; 5] = [
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Reddit,
        Platform::Youtube,
        Platform::Telegram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Reddit => "reddit",
            Platform::Youtube => "youtube",
            Platform::Telegram => "telegram",
        }
    }

    /// Comma-separated list used in validation messages
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == token)
            .ok_or_else(|| format!("unsupported platform: {}", s.trim()))
    }
}

/// Normalize raw platform tokens into the closed platform set.
///
/// Unknown tokens are dropped silently and duplicates keep their first
/// position.
pub fn parse_platforms<I, S>(tokens: I) -> Vec<Platform>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut platforms = Vec::new();
    for token in tokens {
        if let Ok(platform) = token.as_ref().parse::<Platform>() {
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
    }
    platforms
}

/// A validated generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    text: String,
    platforms: Vec<Platform>,
}

impl GenerateRequest {
    /// Validate and build a request. Text is checked before platforms.
    pub fn new(text: &str, platforms: Vec<Platform>) -> Result<Self, ChopError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChopError::EmptyText);
        }

        let mut unique = Vec::with_capacity(platforms.len());
        for platform in platforms {
            if !unique.contains(&platform) {
                unique.push(platform);
            }
        }
        if unique.is_empty() {
            return Err(ChopError::NoValidPlatforms);
        }

        Ok(GenerateRequest {
            text: text.to_string(),
            platforms: unique,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }
}

/// One generated post, tagged by platform on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum GenerateResult {
    Twitter { threads: Vec<String> },
    Linkedin { post: String },
    Reddit { title: String, post: String },
    Youtube { script: String },
    Telegram { post: String },
}

impl GenerateResult {
    pub fn platform(&self) -> Platform {
        match self {
            GenerateResult::Twitter { .. } => Platform::Twitter,
            GenerateResult::Linkedin { .. } => Platform::Linkedin,
            GenerateResult::Reddit { .. } => Platform::Reddit,
            GenerateResult::Youtube { .. } => Platform::Youtube,
            GenerateResult::Telegram { .. } => Platform::Telegram,
        }
    }
}

/// Success payload returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub request_id: String,
    pub posts: Vec<GenerateResult>,
    pub source_text_length: usize,
    pub platforms_used: Vec<Platform>,
}

/// Error payload returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
