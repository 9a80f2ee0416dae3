//! Environment-style configuration.
//!
//! All keys are prefixed `HUGINN_`. Provider credentials are opaque and
//! passed through to the backend client unmodified.
//!
//! | Key | Effect |
//! |-----|--------|
//! | `HUGINN_PROVIDER` | `openai` or `gemini` |
//! | `HUGINN_MODEL` | model identifier to address |
//! | `HUGINN_API_KEY` | backend credential (pass-through) |
//! | `HUGINN_CACHE_ENABLED` | `false` disables cache reads and writes |
//! | `HUGINN_CACHE_TTL_MS` | entry max age in milliseconds (default 3600000) |
//! | `HUGINN_CACHE_MAX_SIZE` | entry count bound (default 1000) |

use std::time::Duration;

use crate::cache::CacheConfig;
use crate::{HuginnError, Result};

/// Which backend vendor family to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

/// Resolved configuration for building a gateway.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: String,
    pub cache: CacheConfig,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read configuration through a key lookup (testable seam).
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match required(&lookup, "HUGINN_PROVIDER")?.as_str() {
            "openai" => ProviderKind::OpenAi,
            "gemini" => ProviderKind::Gemini,
            other => {
                return Err(HuginnError::Configuration(format!(
                    "unknown provider '{other}', expected 'openai' or 'gemini'"
                )));
            }
        };

        let mut cache = CacheConfig::default();
        if let Some(raw) = lookup("HUGINN_CACHE_ENABLED") {
            cache.enabled = parse(&raw, "HUGINN_CACHE_ENABLED")?;
        }
        if let Some(raw) = lookup("HUGINN_CACHE_TTL_MS") {
            cache.max_age = Duration::from_millis(parse(&raw, "HUGINN_CACHE_TTL_MS")?);
        }
        if let Some(raw) = lookup("HUGINN_CACHE_MAX_SIZE") {
            cache.max_size = parse(&raw, "HUGINN_CACHE_MAX_SIZE")?;
        }

        Ok(Self {
            provider,
            model: required(&lookup, "HUGINN_MODEL")?,
            api_key: required(&lookup, "HUGINN_API_KEY")?,
            cache,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key).ok_or_else(|| HuginnError::Configuration(format!("{key} not set")))
}

fn parse<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| HuginnError::Configuration(format!("invalid value '{raw}' for {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn minimal_config_uses_cache_defaults() {
        let config = Config::from_vars(vars(&[
            ("HUGINN_PROVIDER", "openai"),
            ("HUGINN_MODEL", "gpt-4o-mini"),
            ("HUGINN_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_age, Duration::from_secs(3600));
        assert_eq!(config.cache.max_size, 1000);
    }

    #[test]
    fn cache_overrides_apply() {
        let config = Config::from_vars(vars(&[
            ("HUGINN_PROVIDER", "gemini"),
            ("HUGINN_MODEL", "gemini-2.0-flash"),
            ("HUGINN_API_KEY", "key"),
            ("HUGINN_CACHE_ENABLED", "false"),
            ("HUGINN_CACHE_TTL_MS", "60000"),
            ("HUGINN_CACHE_MAX_SIZE", "10"),
        ]))
        .unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_age, Duration::from_millis(60000));
        assert_eq!(config.cache.max_size, 10);
    }

    #[test]
    fn missing_provider_is_a_configuration_error() {
        let err = Config::from_vars(vars(&[("HUGINN_MODEL", "m")])).unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let err = Config::from_vars(vars(&[
            ("HUGINN_PROVIDER", "cohere"),
            ("HUGINN_MODEL", "m"),
            ("HUGINN_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }

    #[test]
    fn invalid_number_is_a_configuration_error() {
        let err = Config::from_vars(vars(&[
            ("HUGINN_PROVIDER", "openai"),
            ("HUGINN_MODEL", "m"),
            ("HUGINN_API_KEY", "k"),
            ("HUGINN_CACHE_MAX_SIZE", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }
}
