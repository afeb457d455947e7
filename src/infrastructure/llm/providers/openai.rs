//! OpenAI-compatible API provider
//!
//! Supports OpenAI, Groq, xAI and other OpenAI-compatible APIs. Tools are published as
//! functions; results go back as `role: tool` messages.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ProviderConfig;
use crate::domain::types::{ModelReply, ReplyBlock, ToolCall};
use crate::infrastructure::llm::{Block, Context, Error, MessageRole, Provider, Response, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    /// JSON-encoded arguments.
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

fn wire_messages(context: &Context) -> Vec<Value> {
    let mut out = Vec::new();

    for msg in &context.messages {
        match msg.role {
            MessageRole::User => {
                let mut text = Vec::new();
                for block in &msg.blocks {
                    match block {
                        Block::ToolResult {
                            call_id,
                            content,
                            is_error,
                        } => {
                            let content = if *is_error {
                                format!("Error: {}", content)
                            } else {
                                content.clone()
                            };
                            out.push(json!({
                                "role": "tool",
                                "tool_call_id": call_id,
                                "content": content,
                            }));
                        }
                        Block::Text(t) => text.push(t.as_str()),
                        Block::ToolUse { .. } => {}
                    }
                }
                if !text.is_empty() {
                    out.push(json!({"role": "user", "content": text.join("\n\n")}));
                }
            }
            MessageRole::Assistant => {
                let mut text = Vec::new();
                let mut calls = Vec::new();
                for block in &msg.blocks {
                    match block {
                        Block::Text(t) => text.push(t.as_str()),
                        Block::ToolUse { id, name, input } => calls.push(json!({
                            "id": id,
                            "type": "function",
                            "function": {"name": name, "arguments": input.to_string()},
                        })),
                        Block::ToolResult { .. } => {}
                    }
                }
                let content = if text.is_empty() {
                    Value::Null
                } else {
                    Value::String(text.join("\n\n"))
                };
                let mut message = json!({"role": "assistant", "content": content});
                if !calls.is_empty() {
                    message["tool_calls"] = Value::Array(calls);
                }
                out.push(message);
            }
        }
    }

    out
}

fn build_request(config: &ProviderConfig, context: &Context) -> OpenAIRequest {
    OpenAIRequest {
        model: context
            .model
            .clone()
            .unwrap_or_else(|| config.default_model.clone()),
        messages: wire_messages(context),
        tools: context
            .tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema,
                    }
                })
            })
            .collect(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

fn into_response(provider: Provider, resp: OpenAIResponse) -> Result<Response, Error> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::new(provider.as_str(), "No choices in response"))?;

    let mut blocks = Vec::new();
    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        blocks.push(ReplyBlock::Text(text));
    }
    for call in choice.message.tool_calls {
        let args = call.function.arguments;
        // Unparseable arguments are passed through; the tool reports them as malformed.
        let input = if args.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&args).unwrap_or(Value::String(args))
        };
        blocks.push(ReplyBlock::ToolCall(ToolCall::new(call.id, call.function.name, input)));
    }

    Ok(Response {
        reply: ModelReply {
            blocks,
            stop_reason: choice.finish_reason,
        },
        model: resp.model,
        usage: TokenUsage {
            prompt_tokens: resp.usage.prompt_tokens,
            completion_tokens: resp.usage.completion_tokens,
        },
    })
}

/// Execute a chat request using OpenAI-compatible API
pub async fn chat(
    provider: Provider,
    config: &ProviderConfig,
    http: &reqwest::Client,
    context: Context,
) -> Result<Response, Error> {
    let name = provider.as_str();
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let request = build_request(config, &context);

    let response = http
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|e| Error::new(name, format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(Error::new(name, format!("HTTP {}: {}", status, error_text)));
    }

    let openai_response: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| Error::new(name, format!("Failed to parse response: {}", e)))?;

    into_response(provider, openai_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Conversation;
    use crate::domain::types::{ToolResult, ToolSpec};

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: "k".into(),
            base_url: None,
            default_model: "gpt-4o".into(),
            max_tokens: 1024,
            temperature: Some(0.2),
        }
    }

    #[test]
    fn test_tool_results_become_tool_messages() {
        let mut convo = Conversation::new();
        convo.push_operator("go").unwrap();
        convo
            .push_reply(&ModelReply::new(vec![
                ReplyBlock::Text("Copying.".into()),
                ReplyBlock::ToolCall(ToolCall::new(
                    "call_1",
                    "copy_file",
                    json!({"initial_path": "/scan/a.mkv", "ending_path": "/lib/movies/a.mkv"}),
                )),
            ]))
            .unwrap();
        convo
            .push_tool_results(vec![ToolResult::failure("call_1", "access denied")])
            .unwrap();
        convo.push_operator("try again").unwrap();

        let tools = vec![ToolSpec {
            name: "copy_file".into(),
            description: "copy".into(),
            input_schema: json!({"type": "object"}),
        }];
        let context = Context::from_conversation(&convo).with_tools(tools);
        let body = serde_json::to_value(build_request(&config(), &context)).unwrap();
        let messages = body["messages"].as_array().unwrap();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "Copying.");
        assert_eq!(messages[1]["tool_calls"][0]["function"]["name"], "copy_file");
        let args: Value =
            serde_json::from_str(messages[1]["tool_calls"][0]["function"]["arguments"].as_str().unwrap())
                .unwrap();
        assert_eq!(args["ending_path"], "/lib/movies/a.mkv");
        assert_eq!(
            messages[2],
            json!({"role": "tool", "tool_call_id": "call_1", "content": "Error: access denied"})
        );
        assert_eq!(messages[3], json!({"role": "user", "content": "try again"}));
        assert_eq!(body["tools"][0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_response_with_tool_calls() {
        let raw = json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "call_a", "type": "function",
                         "function": {"name": "search_imdb", "arguments": "{\"search_term\":\"Film\"}"}},
                        {"id": "call_b", "type": "function",
                         "function": {"name": "read_file", "arguments": "{broken"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        });
        let resp: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let response = into_response(Provider::OpenAI, resp).unwrap();

        assert_eq!(
            response.reply.blocks,
            vec![
                ReplyBlock::ToolCall(ToolCall::new("call_a", "search_imdb", json!({"search_term": "Film"}))),
                ReplyBlock::ToolCall(ToolCall::new("call_b", "read_file", json!("{broken"))),
            ]
        );
        assert_eq!(response.reply.stop_reason.as_deref(), Some("tool_calls"));
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let resp: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        let err = into_response(Provider::Groq, resp).unwrap_err();
        assert_eq!(err.provider, "groq");
    }
}
