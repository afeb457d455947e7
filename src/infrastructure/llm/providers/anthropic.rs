//! Anthropic (Claude) provider with tool use
//!
//! Tool calls arrive as `tool_use` content blocks; results go back as `tool_result`
//! blocks on the following user message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderConfig;
use crate::domain::types::{ModelReply, ReplyBlock, ToolCall, ToolSpec};
use crate::infrastructure::llm::{Block, Context, Error, Response, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API request format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Anthropic message format
#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicContentBlock>,
}

/// Anthropic content block
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicResponseContent>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: AnthropicUsage,
}

/// Anthropic response content
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicResponseContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Anthropic usage information
#[derive(Debug, Default, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

fn build_request(config: &ProviderConfig, context: &Context) -> AnthropicRequest {
    let messages = context
        .messages
        .iter()
        .map(|msg| AnthropicMessage {
            role: msg.role.as_str().to_string(),
            content: msg
                .blocks
                .iter()
                .map(|block| match block {
                    Block::Text(text) => AnthropicContentBlock::Text { text: text.clone() },
                    Block::ToolUse { id, name, input } => AnthropicContentBlock::ToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input: input.clone(),
                    },
                    Block::ToolResult {
                        call_id,
                        content,
                        is_error,
                    } => AnthropicContentBlock::ToolResult {
                        tool_use_id: call_id.clone(),
                        content: content.clone(),
                        is_error: *is_error,
                    },
                })
                .collect(),
        })
        .collect();

    AnthropicRequest {
        model: context
            .model
            .clone()
            .unwrap_or_else(|| config.default_model.clone()),
        max_tokens: config.max_tokens,
        messages,
        tools: context.tools.clone(),
        temperature: config.temperature,
    }
}

fn into_response(resp: AnthropicResponse) -> Response {
    let blocks = resp
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicResponseContent::Text { text } => Some(ReplyBlock::Text(text)),
            AnthropicResponseContent::ToolUse { id, name, input } => {
                Some(ReplyBlock::ToolCall(ToolCall::new(id, name, input)))
            }
            AnthropicResponseContent::Other => None,
        })
        .collect();

    Response {
        reply: ModelReply {
            blocks,
            stop_reason: resp.stop_reason,
        },
        model: resp.model,
        usage: TokenUsage {
            prompt_tokens: resp.usage.input_tokens,
            completion_tokens: resp.usage.output_tokens,
        },
    }
}

/// Execute a chat request using Anthropic's API
pub async fn chat(
    config: &ProviderConfig,
    http: &reqwest::Client,
    context: Context,
) -> Result<Response, Error> {
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let url = format!("{}/v1/messages", base_url.trim_end_matches('/'));
    let request = build_request(config, &context);

    let response = http
        .post(&url)
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", API_VERSION)
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|e| Error::new("anthropic", format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        // Try to parse error message from response
        if let Ok(error_json) = serde_json::from_str::<Value>(&error_text) {
            if let Some(error) = error_json.get("error") {
                if let (Some(error_type), Some(error_msg)) = (error.get("type"), error.get("message")) {
                    return Err(Error::new(
                        "anthropic",
                        format!("{}: {}", error_type, error_msg),
                    ));
                }
            }
        }

        return Err(Error::new(
            "anthropic",
            format!("HTTP {}: {}", status, error_text),
        ));
    }

    let anthropic_response: AnthropicResponse = response
        .json()
        .await
        .map_err(|e| Error::new("anthropic", format!("Failed to parse response: {}", e)))?;

    Ok(into_response(anthropic_response))
}
