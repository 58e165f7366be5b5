use crate::config::{ChopConfig, ProviderConfig};
use crate::error::ChopError;
use crate::providers::{GoogleProvider, GroqProvider, LlmProvider};
use log::{debug, info};
use reqwest::Client;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        client: Client,
    ) -> Result<Box<dyn LlmProvider>, ChopError> {
        match provider_name {
            "groq" => Ok(Box::new(GroqProvider::new(config, client)?)),
            "google" => Ok(Box::new(GoogleProvider::new(config, client)?)),
            _ => Err(ChopError::BuilderError(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Providers in call order: primary first, then secondary.
    ///
    /// Disabled providers and providers without a key are skipped.
    pub fn from_config(
        config: &ChopConfig,
        client: &Client,
    ) -> Result<Vec<Box<dyn LlmProvider>>, ChopError> {
        let mut providers = Vec::new();

        for (name, provider_config) in [("groq", &config.groq), ("google", &config.google)] {
            if !provider_config.is_usable() {
                debug!("Skipping provider '{}' (disabled or no API key)", name);
                continue;
            }
            providers.push(Self::create(name, provider_config, client.clone())?);
            info!("Added '{}' to provider chain", name);
        }

        Ok(providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: Some(key.to_string()),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_create_known_providers() {
        let groq = ProviderFactory::create("groq", &keyed("k"), Client::new()).unwrap();
        assert_eq!(groq.provider_name(), "groq");

        let google = ProviderFactory::create("google", &keyed("k"), Client::new()).unwrap();
        assert_eq!(google.provider_name(), "google");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = ProviderFactory::create("openai", &keyed("k"), Client::new());
        match result {
            Err(e) => assert!(e.to_string().contains("Unknown provider")),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_from_config_orders_primary_first() {
        let config = ChopConfig {
            groq: keyed("g"),
            google: keyed("x"),
            ..ChopConfig::default()
        };
        let providers = ProviderFactory::from_config(&config, &Client::new()).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.provider_name()).collect();
        assert_eq!(names, vec!["groq", "google"]);
    }

    #[test]
    fn test_from_config_skips_unusable_providers() {
        let mut google = keyed("x");
        google.enabled = false;
        let config = ChopConfig {
            groq: ProviderConfig::default(),
            google,
            ..ChopConfig::default()
        };
        let providers = ProviderFactory::from_config(&config, &Client::new()).unwrap();
        assert!(providers.is_empty());
    }
}
