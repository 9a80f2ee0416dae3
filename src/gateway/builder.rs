//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use super::Gateway;
use crate::cache::{CacheConfig, ResponseCache};
use crate::config::{Config, ProviderKind};
use crate::providers::{GeminiProvider, ModelProvider, OpenAiProvider};
use crate::{HuginnError, Result};

/// Main entry point for creating gateway instances.
pub struct Huginn;

impl Huginn {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> HuginnBuilder {
        HuginnBuilder::new()
    }

    /// Build a gateway from environment configuration.
    pub fn from_env() -> Result<Gateway> {
        HuginnBuilder::from_config(Config::from_env()?).build()
    }
}

/// Builder for configuring gateway instances.
pub struct HuginnBuilder {
    openai_key: Option<String>,
    gemini_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    cache: CacheConfig,
}

impl HuginnBuilder {
    pub fn new() -> Self {
        Self {
            openai_key: None,
            gemini_key: None,
            model: None,
            base_url: None,
            timeout_secs: None,
            cache: CacheConfig::default(),
        }
    }

    /// Pre-populate the builder from a [`Config`].
    pub fn from_config(config: Config) -> Self {
        let builder = Self::new().model(config.model).cache(config.cache);
        match config.provider {
            ProviderKind::OpenAi => builder.openai(config.api_key),
            ProviderKind::Gemini => builder.gemini(config.api_key),
        }
    }

    /// Configure the strict-mode vendor (OpenAI).
    pub fn openai(mut self, api_key: impl Into<String>) -> Self {
        self.openai_key = Some(api_key.into());
        self
    }

    /// Configure the schema-stripping vendor (Gemini).
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.gemini_key = Some(api_key.into());
        self
    }

    /// Set the model identifier to address.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the vendor API base URL (testing with wiremock).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP timeout for all requests (seconds).
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Configure the response cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<Gateway> {
        let model = self
            .model
            .ok_or_else(|| HuginnError::Configuration("model identifier not set".into()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs.unwrap_or(120)))
            .build()
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let provider: Arc<dyn ModelProvider> = match (self.openai_key, self.gemini_key) {
            (Some(_), Some(_)) => {
                return Err(HuginnError::Configuration(
                    "configure exactly one provider".into(),
                ));
            }
            (Some(key), None) => {
                let mut provider = OpenAiProvider::with_http_client(key, model, http_client);
                if let Some(url) = self.base_url {
                    provider = provider.base_url(url);
                }
                Arc::new(provider)
            }
            (None, Some(key)) => {
                let mut provider = GeminiProvider::with_http_client(key, model, http_client);
                if let Some(url) = self.base_url {
                    provider = provider.base_url(url);
                }
                Arc::new(provider)
            }
            (None, None) => return Err(HuginnError::NoProvider),
        };

        Ok(Gateway::new(provider, ResponseCache::new(self.cache)))
    }
}

impl Default for HuginnBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_provider_fails() {
        let err = Huginn::builder().model("gpt-4o-mini").build().unwrap_err();
        assert!(matches!(err, HuginnError::NoProvider));
    }

    #[test]
    fn build_without_model_fails() {
        let err = Huginn::builder().openai("key").build().unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }

    #[test]
    fn build_with_both_providers_fails() {
        let err = Huginn::builder()
            .openai("key")
            .gemini("key")
            .model("m")
            .build()
            .unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }

    #[test]
    fn build_with_one_provider_succeeds() {
        let gateway = Huginn::builder()
            .gemini("key")
            .model("gemini-2.0-flash")
            .build()
            .unwrap();
        assert_eq!(gateway.name(), "gemini");
    }
}
