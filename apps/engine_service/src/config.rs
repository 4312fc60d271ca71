use std::{env, time::Duration};

use brevity_core::{ContentPolicy, RefinementConfig};
use brevity_llm::{LLMClientConfig, LLMProvider, ProviderSettings};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub environment: String,
    pub bind_address: String,
    pub provider: ProviderSettings,
    pub llm: LLMClientConfig,
    pub policy: ContentPolicy,
    pub refinement: RefinementConfig,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let provider: LLMProvider = get("LLM_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .parse()
            .map_err(|e: brevity_llm::LLMError| ConfigError::Invalid(e.to_string()))?;

        let mut settings = match provider {
            LLMProvider::Gemini => {
                let key = get("GEMINI_API_KEY")
                    .or_else(|| get("API_KEY"))
                    .ok_or_else(|| ConfigError::Missing("GEMINI_API_KEY".to_string()))?;
                ProviderSettings::new(provider, key)
            }
            LLMProvider::OpenAI => {
                let key = get("OPENAI_API_KEY")
                    .ok_or_else(|| ConfigError::Missing("OPENAI_API_KEY".to_string()))?;
                let mut settings = ProviderSettings::new(provider, key);
                if let Some(org_id) = get("OPENAI_ORG_ID") {
                    settings = settings.with_org_id(org_id);
                }
                settings
            }
        };
        if let Some(model) = get("LLM_MODEL") {
            settings = settings.with_model(model);
        }

        let timeout_secs = parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), 180u64)?;
        let max_symbols = parse_or("MAX_SYMBOLS", get("MAX_SYMBOLS"), 5usize)?;
        let prime_conversation = parse_or("PRIME_CONVERSATION", get("PRIME_CONVERSATION"), true)?;

        Ok(Self {
            environment: get("APP_ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            provider: settings,
            llm: LLMClientConfig {
                timeout: Duration::from_secs(timeout_secs),
            },
            policy: ContentPolicy::default().with_max_symbols(max_symbols),
            refinement: RefinementConfig { prime_conversation },
        })
    }

    pub fn is_dev(&self) -> bool {
        self.environment == "dev"
    }

    /// Upper bound for a whole HTTP request. An operation makes at most two
    /// model calls in a row (generate then prime, or seed then instruct),
    /// each bounded by the model timeout.
    pub fn request_timeout(&self) -> Duration {
        self.llm.timeout * 2 + Duration::from_secs(10)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}
