//! Request handling from inbound body to response payload.

use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::config::ChopConfig;
use crate::error::ChopError;
use crate::extract::TextExtractor;
use crate::fallback::fallback_generate;
use crate::model::{ErrorBody, GenerateRequest, GenerateResponse, GenerateResult, Platform};
use crate::providers::{GenerationClient, ProviderFactory};
use crate::request::{normalize_request, InboundRequest};

/// Payload written back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Success(GenerateResponse),
    Error(ErrorBody),
}

/// Status code plus payload, independent of any HTTP framework
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn success(response: GenerateResponse) -> Self {
        ApiResponse {
            status: StatusCode::OK,
            body: ResponseBody::Success(response),
        }
    }

    /// Validation errors carry their message; anything else is reported
    /// as an internal error with the message in `details`.
    pub fn from_error(err: &ChopError) -> Self {
        let status = err.status();
        let body = if err.is_validation() {
            ErrorBody {
                error: err.to_string(),
                details: None,
            }
        } else {
            ErrorBody {
                error: "Internal server error".to_string(),
                details: Some(err.to_string()),
            }
        };
        ApiResponse {
            status,
            body: ResponseBody::Error(body),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Append fallback posts for every requested platform the provider skipped
pub fn fill_gaps(
    mut results: Vec<GenerateResult>,
    text: &str,
    requested: &[Platform],
) -> Vec<GenerateResult> {
    let missing: Vec<Platform> = requested
        .iter()
        .copied()
        .filter(|p| !results.iter().any(|r| r.platform() == *p))
        .collect();

    if !missing.is_empty() {
        info!(
            "Filling {} missing platform(s) with templates: {:?}",
            missing.len(),
            missing
        );
        results.extend(fallback_generate(text, &missing));
    }
    results
}

/// Outbound request timeout, never below one second
pub(crate) fn request_timeout(config: &ChopConfig) -> Duration {
    Duration::from_secs(config.timeout.max(1))
}

fn http_client(config: &ChopConfig) -> Result<Client, ChopError> {
    Ok(Client::builder().timeout(request_timeout(config)).build()?)
}

/// Turns source content into one post per requested platform
pub struct Repurposer {
    client: GenerationClient,
    extractor: TextExtractor,
}

impl Repurposer {
    pub fn new(client: GenerationClient, extractor: TextExtractor) -> Self {
        Repurposer { client, extractor }
    }

    /// Wire up providers and extraction from configuration.
    ///
    /// Providers without a key are skipped, so an empty configuration
    /// produces a repurposer that only uses templates.
    pub fn from_config(config: &ChopConfig) -> Result<Self, ChopError> {
        let http = http_client(config)?;
        let client = GenerationClient::new(ProviderFactory::from_config(config, &http)?);
        if !client.is_empty() {
            info!("Provider chain: {}", client.provider_names().join(" -> "));
        }
        let extractor = TextExtractor::new(config.extraction.clone(), http);
        Ok(Repurposer::new(client, extractor))
    }

    /// Template-only repurposer that never calls a provider
    pub fn offline(config: &ChopConfig) -> Result<Self, ChopError> {
        let http = http_client(config)?;
        let extractor = TextExtractor::new(config.extraction.clone(), http);
        Ok(Repurposer::new(GenerationClient::new(Vec::new()), extractor))
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Generate one post per requested platform. Never fails.
    pub async fn generate_posts(&self, request: &GenerateRequest) -> Vec<GenerateResult> {
        let text = request.text();
        let platforms = request.platforms();

        if self.client.is_empty() {
            info!("No generation provider configured, using templates");
            return fallback_generate(text, platforms);
        }

        match self.client.generate(text, platforms).await {
            Ok(results) => fill_gaps(results, text, platforms),
            Err(e) => {
                warn!("Generation failed, falling back to templates: {}", e);
                fallback_generate(text, platforms)
            }
        }
    }

    /// Run the pipeline for an already validated request
    pub async fn respond(&self, request: &GenerateRequest) -> GenerateResponse {
        let posts = self.generate_posts(request).await;
        GenerateResponse {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            posts,
            source_text_length: request.text().chars().count(),
            platforms_used: request.platforms().to_vec(),
        }
    }

    /// Normalize an inbound request and answer it
    pub async fn handle(&self, inbound: &InboundRequest) -> ApiResponse {
        match normalize_request(inbound, &self.extractor).await {
            Ok(request) => ApiResponse::success(self.respond(&request).await),
            Err(e) => {
                if e.is_validation() {
                    info!("Rejected request: {}", e);
                } else {
                    warn!("Failed to read request: {}", e);
                }
                ApiResponse::from_error(&e)
            }
        }
    }
}
