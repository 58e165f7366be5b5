use crate::config::ProviderConfig;
use crate::error::ChopError;
use crate::providers::{model_candidates, LlmProvider, DETAILED_SYSTEM_PROMPT};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MAX_TOKENS: u32 = 3072;

/// Built-in Gemini models known to be served on v1beta
pub const GOOGLE_MODELS: &[&str] = &[
    "gemini-1.5-flash-001",
    "gemini-1.5-flash",
    "gemini-1.5-pro-001",
];

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig, client: Client) -> Result<Self, ChopError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ChopError::MissingApiKey("GOOGLE_AI_API_KEY"))?;

        Ok(GoogleProvider {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            models: model_candidates(
                config.model.as_deref(),
                &config.fallback_models,
                GOOGLE_MODELS,
            ),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_candidates(&self) -> &[String] {
        &self.models
    }

    fn system_prompt(&self) -> &str {
        DETAILED_SYSTEM_PROMPT
    }

    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ChopError> {
        // Google Gemini API endpoint
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "system_instruction": {"parts": [{"text": system_prompt}]},
                "contents": [{
                    "role": "user",
                    "parts": [{"text": user_prompt}]
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "topP": self.top_p,
                    "maxOutputTokens": self.max_tokens,
                    "responseMimeType": "application/json"
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(ChopError::ProviderStatus {
                provider: "Google AI".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let parts = response_body["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| ChopError::EmptyContent("Google AI".to_string()))?;

        let text = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}
