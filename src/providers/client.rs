use crate::error::ChopError;
use crate::model::{GenerateResult, Platform};
use crate::normalize::{normalize_results, parse_lenient_json};
use crate::providers::{build_user_prompt, first_success, LlmProvider};
use log::{info, warn};
use serde_json::Value;

/// Calls providers in order, each through its model cascade.
pub struct GenerationClient {
    providers: Vec<Box<dyn LlmProvider>>,
}

impl GenerationClient {
    pub fn new(providers: Vec<Box<dyn LlmProvider>>) -> Self {
        GenerationClient { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Generate normalized results for `platforms`.
    ///
    /// The first provider whose cascade yields at least one valid result
    /// wins. Results may cover only some of the requested platforms.
    pub async fn generate(
        &self,
        text: &str,
        platforms: &[Platform],
    ) -> Result<Vec<GenerateResult>, ChopError> {
        let user_prompt = build_user_prompt(text, platforms);
        let mut last_error = None;

        for provider in &self.providers {
            match try_provider(provider.as_ref(), &user_prompt, platforms).await {
                Ok(results) => {
                    info!(
                        "Generated {} post(s) using {}",
                        results.len(),
                        provider.provider_name()
                    );
                    return Ok(results);
                }
                Err(e) => {
                    warn!("Provider {} exhausted: {}", provider.provider_name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ChopError::NoModelCandidates("any provider".to_string())))
    }
}

async fn try_provider(
    provider: &dyn LlmProvider,
    user_prompt: &str,
    platforms: &[Platform],
) -> Result<Vec<GenerateResult>, ChopError> {
    let system_prompt = provider.system_prompt();

    first_success(
        provider.provider_name(),
        provider.model_candidates(),
        |model| async move {
            let content = provider
                .complete(&model, system_prompt, user_prompt)
                .await?;
            results_from_content(provider.provider_name(), &content, platforms)
        },
    )
    .await
}

/// Turn raw provider content into validated results.
pub(crate) fn results_from_content(
    provider_name: &str,
    content: &str,
    platforms: &[Platform],
) -> Result<Vec<GenerateResult>, ChopError> {
    let parsed = parse_lenient_json(content).ok_or(ChopError::NoValidResults)?;
    let raw = parsed
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ChopError::MissingResults(provider_name.to_string()))?;

    let results = normalize_results(raw, platforms);
    if results.is_empty() {
        return Err(ChopError::NoValidResults);
    }
    Ok(results)
}
