//! # LLM Providers
//!
//! Wire implementations for the supported APIs:
//! - Anthropic Messages API with tool use
//! - OpenAI-compatible chat completions with function tools (OpenAI, Groq, xAI)

mod anthropic;
mod openai;

use crate::domain::config::AgentConfig;
use crate::infrastructure::llm::{Context, Error, Provider, Response};

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const XAI_BASE_URL: &str = "https://api.x.ai/v1";

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for non-default endpoints)
    pub base_url: Option<String>,
    /// Default model
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_agent_config(config: &AgentConfig, provider: Provider) -> Result<Self, Error> {
        Self::from_agent_config_with(config, provider, |key| std::env::var(key).ok())
    }

    /// Same as [`from_agent_config`](Self::from_agent_config) with an explicit env lookup.
    pub fn from_agent_config_with(
        config: &AgentConfig,
        provider: Provider,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let api_key = if let Some(key) = config.api_key.as_ref().filter(|k| !k.is_empty()) {
            key.clone()
        } else {
            let env_var = config
                .api_key_env
                .as_deref()
                .unwrap_or(provider.default_api_key_env());
            env(env_var).filter(|k| !k.is_empty()).ok_or_else(|| {
                Error::new(
                    provider.as_str(),
                    format!("No API key provided - set api_key or the {} environment variable", env_var),
                )
            })?
        };

        let base_url = config.endpoint.clone().or_else(|| match provider {
            Provider::Groq => Some(GROQ_BASE_URL.to_string()),
            Provider::XAI => Some(XAI_BASE_URL.to_string()),
            Provider::OpenAI | Provider::Anthropic => None,
        });

        Ok(Self {
            api_key,
            base_url,
            default_model: config
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

/// Execute a chat request with the specified provider
pub async fn chat(
    provider: Provider,
    config: &ProviderConfig,
    http: &reqwest::Client,
    context: Context,
) -> Result<Response, Error> {
    match provider {
        Provider::Anthropic => anthropic::chat(config, http, context).await,
        Provider::OpenAI | Provider::Groq | Provider::XAI => {
            openai::chat(provider, config, http, context).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_api_key_from_default_env_var() {
        let env: HashMap<&str, &str> = [("ANTHROPIC_API_KEY", "sk-test")].into_iter().collect();
        let config = ProviderConfig::from_agent_config_with(
            &AgentConfig::default(),
            Provider::Anthropic,
            |k| env.get(k).map(|v| v.to_string()),
        )
        .unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.default_model, "claude-3-7-sonnet-latest");
        assert_eq!(config.max_tokens, 1024);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = ProviderConfig::from_agent_config_with(&AgentConfig::default(), Provider::OpenAI, |_| None)
            .unwrap_err();
        assert_eq!(err.provider, "openai");
        assert!(err.message.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_groq_gets_fixed_base_url_unless_overridden() {
        let mut agent = AgentConfig {
            api_key: Some("k".into()),
            ..AgentConfig::default()
        };
        let config = ProviderConfig::from_agent_config_with(&agent, Provider::Groq, |_| None).unwrap();
        assert_eq!(config.base_url.as_deref(), Some(GROQ_BASE_URL));

        agent.endpoint = Some("http://localhost:8080/v1".into());
        let config = ProviderConfig::from_agent_config_with(&agent, Provider::Groq, |_| None).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let agent = AgentConfig {
            api_key: Some("secret-key".into()),
            ..AgentConfig::default()
        };
        let config = ProviderConfig::from_agent_config_with(&agent, Provider::Anthropic, |_| None).unwrap();
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
