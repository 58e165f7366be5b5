use crate::config::ProviderConfig;
use crate::error::ChopError;
use crate::providers::{model_candidates, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.groq.com";
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Built-in models, strongest first, cheapest fast option last
pub const GROQ_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-70b-versatile",
    "llama-3.1-8b-instant",
];

pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl GroqProvider {
    /// Create a new Groq provider from configuration
    pub fn new(config: &ProviderConfig, client: Client) -> Result<Self, ChopError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ChopError::MissingApiKey("GROQ_API_KEY"))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(GroqProvider {
            client,
            api_key,
            base_url,
            models: model_candidates(
                config.model.as_deref(),
                &config.fallback_models,
                GROQ_MODELS,
            ),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, models: Vec<String>) -> Self {
        GroqProvider {
            client: Client::new(),
            api_key,
            base_url,
            models,
            temperature: 0.35,
            top_p: 0.95,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn provider_name(&self) -> &str {
        "groq"
    }

    fn model_candidates(&self) -> &[String] {
        &self.models
    }

    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ChopError> {
        let response = self
            .client
            .post(format!("{}/openai/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": model,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": user_prompt}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
                "top_p": self.top_p,
                "response_format": {"type": "json_object"}
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
                provider: "Groq".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        response_body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChopError::EmptyContent("Groq".to_string()))
    }
}
