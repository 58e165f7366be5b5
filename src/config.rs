use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ChopConfig {
    /// Primary chat-completion provider (Groq)
    #[serde(default)]
    pub groq: ProviderConfig,
    /// Secondary provider (Google AI), tried after the primary is exhausted
    #[serde(default)]
    pub google: ProviderConfig,
    /// Attachment text extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ChopConfig {
    fn default() -> Self {
        Self {
            groq: ProviderConfig::default(),
            google: ProviderConfig::default(),
            extraction: ExtractionConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for a generation provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider may be called at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API key; a provider without one is skipped
    pub api_key: Option<String>,
    /// Model tried before any built-in fallback
    pub model: Option<String>,
    /// Extra models tried after the override and before the built-ins
    #[serde(default)]
    pub fallback_models: Vec<String>,
    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Maximum tokens to generate (provider default when unset)
    pub max_tokens: Option<u32>,
    /// Base URL for API endpoint (for proxies and tests)
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            model: None,
            fallback_models: Vec::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: None,
            base_url: None,
        }
    }
}

impl ProviderConfig {
    /// Enabled and holding a non-blank key
    pub fn is_usable(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Configuration for turning attachments into text
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Longest extracted text kept per attachment, in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// OCR.space key; preferred OCR backend when present
    pub ocr_space_api_key: Option<String>,
    /// OCR.space endpoint
    #[serde(default = "default_ocr_space_url")]
    pub ocr_space_url: String,
    /// Google Vision key; used when OCR.space is not configured
    pub google_vision_api_key: Option<String>,
    /// Google Vision base URL
    #[serde(default = "default_google_vision_url")]
    pub google_vision_url: String,
    /// Key for Whisper transcription (the Groq key)
    pub transcription_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible transcription endpoint
    #[serde(default = "default_transcription_url")]
    pub transcription_url: String,
    /// Whisper model name
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            ocr_space_api_key: None,
            ocr_space_url: default_ocr_space_url(),
            google_vision_api_key: None,
            google_vision_url: default_google_vision_url(),
            transcription_api_key: None,
            transcription_url: default_transcription_url(),
            whisper_model: default_whisper_model(),
        }
    }
}

// Default value functions
fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.35
}

fn default_top_p() -> f32 {
    0.95
}

fn default_timeout() -> u64 {
    30
}

fn default_max_chars() -> usize {
    8000
}

fn default_ocr_space_url() -> String {
    "https://api.ocr.space/parse/image".to_string()
}

fn default_google_vision_url() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_transcription_url() -> String {
    "https://api.groq.com".to_string()
}

fn default_whisper_model() -> String {
    "whisper-large-v3".to_string()
}

impl ChopConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Conventional provider variables (GROQ_API_KEY, GOOGLE_AI_API_KEY, ...)
    /// 2. Environment variables with CHOP__ prefix
    /// 3. chop.toml file in current directory
    /// 4. Default values
    ///
    /// Environment variable format: CHOP__GROQ__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = load_config()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay the conventional environment variables.
    ///
    /// `lookup` resolves a variable name; blank values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|key| get(*key));

        if let Some(key) = get("GROQ_API_KEY") {
            self.groq.api_key = Some(key.clone());
            self.extraction.transcription_api_key.get_or_insert(key);
        }
        if let Some(model) = first(&["GROQ_MODEL", "GROQ_PREFERRED_MODEL"]) {
            self.groq.model = Some(model);
        }
        if let Some(flag) = get("USE_GROQ") {
            self.groq.enabled = parse_flag(&flag);
        }

        if let Some(key) = first(&["GOOGLE_AI_API_KEY", "GOOGLE_API_KEY"]) {
            self.google.api_key = Some(key);
        }
        if let Some(model) = get("GOOGLE_MODEL") {
            self.google.model = Some(model);
        }
        if let Some(flag) = get("USE_GOOGLE_AI") {
            self.google.enabled = parse_flag(&flag);
        }

        if let Some(key) = get("OCR_SPACE_API_KEY") {
            self.extraction.ocr_space_api_key = Some(key);
        }
        if let Some(key) = first(&["GOOGLE_VISION_API_KEY", "GOOGLE_API_KEY"]) {
            self.extraction.google_vision_api_key = Some(key);
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Load configuration from file and CHOP__ prefixed environment variables
pub fn load_config() -> Result<ChopConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("chop").required(false))
        // Use double underscore for nested: CHOP__GROQ__API_KEY
        .add_source(
            Environment::with_prefix("CHOP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ChopConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.groq.enabled);
        assert_eq!(config.groq.temperature, 0.35);
        assert_eq!(config.groq.top_p, 0.95);
        assert_eq!(config.extraction.max_chars, 8000);
        assert_eq!(config.extraction.whisper_model, "whisper-large-v3");
    }

    #[test]
    fn test_provider_without_key_is_not_usable() {
        let mut provider = ProviderConfig::default();
        assert!(!provider.is_usable());

        provider.api_key = Some("   ".to_string());
        assert!(!provider.is_usable());

        provider.api_key = Some("key".to_string());
        assert!(provider.is_usable());

        provider.enabled = false;
        assert!(!provider.is_usable());
    }

    #[test]
    fn test_apply_env_reads_conventional_keys() {
        let mut config = ChopConfig::default();
        config.apply_env(lookup(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("GROQ_PREFERRED_MODEL", "llama-3.1-8b-instant"),
            ("GOOGLE_API_KEY", "goog"),
            ("OCR_SPACE_API_KEY", "ocr"),
        ]));

        assert_eq!(config.groq.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(config.groq.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(
            config.extraction.transcription_api_key.as_deref(),
            Some("gsk-test")
        );
        assert_eq!(config.google.api_key.as_deref(), Some("goog"));
        assert_eq!(
            config.extraction.google_vision_api_key.as_deref(),
            Some("goog")
        );
        assert_eq!(config.extraction.ocr_space_api_key.as_deref(), Some("ocr"));
    }

    #[test]
    fn test_groq_model_beats_preferred_model() {
        let mut config = ChopConfig::default();
        config.apply_env(lookup(&[
            ("GROQ_MODEL", "qwen3-32b-instruct"),
            ("GROQ_PREFERRED_MODEL", "llama-3.1-8b-instant"),
        ]));
        assert_eq!(config.groq.model.as_deref(), Some("qwen3-32b-instruct"));
    }

    #[test]
    fn test_flags_disable_providers() {
        let mut config = ChopConfig::default();
        config.apply_env(lookup(&[
            ("GOOGLE_AI_API_KEY", "goog"),
            ("USE_GOOGLE_AI", "false"),
            ("USE_GROQ", "1"),
        ]));
        assert!(!config.google.enabled);
        assert!(!config.google.is_usable());
        assert!(config.groq.enabled);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = ChopConfig::default();
        config.apply_env(lookup(&[("GROQ_API_KEY", "  ")]));
        assert!(config.groq.api_key.is_none());
    }

    #[test]
    fn test_deserialize_partial_provider_table() {
        let config: ChopConfig = serde_json::from_value(serde_json::json!({
            "groq": { "api_key": "k", "fallback_models": ["gpt-oss-120b"] },
            "timeout": 10
        }))
        .unwrap();

        assert!(config.groq.enabled);
        assert_eq!(config.groq.fallback_models, vec!["gpt-oss-120b"]);
        assert_eq!(config.groq.temperature, 0.35);
        assert_eq!(config.timeout, 10);
        assert_eq!(config.extraction.max_chars, 8000);
    }
}
