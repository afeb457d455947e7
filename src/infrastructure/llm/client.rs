//! # LLM Client
//!
//! Provides the `Client` struct, the entry point for model calls. It resolves the
//! provider and credentials once at startup and routes each request to the provider.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::config::AgentConfig;
use crate::domain::conversation::Conversation;
use crate::domain::traits::LlmProvider;
use crate::domain::types::{ModelReply, ToolSpec};
use crate::infrastructure::llm::providers::{self, ProviderConfig};
use crate::infrastructure::llm::{Context, Error, Provider, Response};
use crate::strings::logs;

pub struct Client {
    provider: Provider,
    config: ProviderConfig,
    http: reqwest::Client,
}

impl Client {
    /// Builds a client from the agent section. Fails on an unknown provider or a
    /// missing API key.
    pub fn from_agent_config(agent: &AgentConfig) -> Result<Self, Error> {
        let provider = Provider::parse(&agent.provider)
            .ok_or_else(|| Error::new(&agent.provider, "Unknown provider"))?;
        let config = ProviderConfig::from_agent_config(agent, provider)?;
        Self::new(provider, config, agent.timeout)
    }

    pub fn new(provider: Provider, config: ProviderConfig, timeout: Option<u64>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| Error::new(provider.as_str(), format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            provider,
            config,
            http,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.config.default_model
    }

    pub async fn chat(&self, context: Context) -> Result<Response, Error> {
        providers::chat(self.provider, &self.config, &self.http, context).await
    }
}

#[async_trait]
impl LlmProvider for Client {
    async fn respond(&self, conversation: &Conversation, tools: &[ToolSpec]) -> anyhow::Result<ModelReply> {
        let context = Context::from_conversation(conversation)
            .with_tools(tools.to_vec())
            .with_model(self.model());
        tracing::debug!(
            provider = self.provider.as_str(),
            messages = context.messages.len(),
            "{}",
            logs::MODEL_REQUEST
        );

        let response = self.chat(context).await?;
        tracing::debug!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            stop_reason = ?response.reply.stop_reason,
            tool_calls = response.reply.has_tool_calls(),
            "Model replied"
        );
        Ok(response.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let agent = AgentConfig {
            provider: "gemini".into(),
            api_key: Some("k".into()),
            ..AgentConfig::default()
        };
        let err = Client::from_agent_config(&agent).err().unwrap();
        assert_eq!(err.to_string(), "[gemini] Unknown provider");
    }

    #[test]
    fn test_configured_model_wins() {
        let agent = AgentConfig {
            provider: "claude".into(),
            model: Some("claude-sonnet-4-0".into()),
            api_key: Some("k".into()),
            ..AgentConfig::default()
        };
        let client = Client::from_agent_config(&agent).unwrap();
        assert_eq!(client.provider(), Provider::Anthropic);
        assert_eq!(client.model(), "claude-sonnet-4-0");
    }
}
