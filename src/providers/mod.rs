mod cascade;
mod client;
mod factory;
mod google;
mod groq;
mod prompt;

pub use cascade::{first_success, model_candidates};
pub use client::GenerationClient;
pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use groq::GroqProvider;
pub use prompt::{build_user_prompt, platform_guideline, DETAILED_SYSTEM_PROMPT, SYSTEM_PROMPT};

use async_trait::async_trait;

use crate::error::ChopError;

/// Unified trait for all chat-completion providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "groq", "google")
    fn provider_name(&self) -> &str;

    /// Models to try, in order
    fn model_candidates(&self) -> &[String];

    /// System prompt this provider is driven with
    fn system_prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    /// Run one completion against `model` and return the raw content text
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ChopError>;
}
