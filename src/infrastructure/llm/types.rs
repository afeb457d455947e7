//! Provider-neutral request and response types for the LLM wrapper

use serde_json::Value;

use crate::domain::conversation::Conversation;
use crate::domain::types::{ModelReply, ToolSpec, Turn};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One piece of message content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(String),
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        call_id: String,
        content: String,
        is_error: bool,
    },
}

/// A chat message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub blocks: Vec<Block>,
}

/// Context for an LLM request
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    pub model: Option<String>,
}

impl Context {
    /// Maps the turn history onto alternating user/assistant messages.
    ///
    /// Operator text and tool results are user content, model text and tool calls are
    /// assistant content. Consecutive turns with the same role merge into one message,
    /// and tool results are placed before any text within a user message.
    pub fn from_conversation(conversation: &Conversation) -> Self {
        let mut messages: Vec<Message> = Vec::new();

        for turn in conversation.turns() {
            let role = if turn.is_model() {
                MessageRole::Assistant
            } else {
                MessageRole::User
            };
            let blocks = match turn {
                Turn::Operator(text) | Turn::ModelText(text) => vec![Block::Text(text.clone())],
                Turn::ModelToolCall(call) => vec![Block::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                }],
                Turn::ToolResults(results) => results
                    .iter()
                    .map(|r| Block::ToolResult {
                        call_id: r.call_id.clone(),
                        content: r.content.clone(),
                        is_error: r.is_error,
                    })
                    .collect(),
            };

            // Providers reject empty text blocks.
            let blocks: Vec<Block> = blocks
                .into_iter()
                .filter(|b| !matches!(b, Block::Text(t) if t.trim().is_empty()))
                .collect();
            if blocks.is_empty() {
                continue;
            }

            match messages.last_mut() {
                Some(last) if last.role == role => last.blocks.extend(blocks),
                _ => messages.push(Message { role, blocks }),
            }
        }

        for message in messages.iter_mut().filter(|m| m.role == MessageRole::User) {
            message
                .blocks
                .sort_by_key(|b| !matches!(b, Block::ToolResult { .. }));
        }

        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Response from an LLM
#[derive(Debug, Clone)]
pub struct Response {
    pub reply: ModelReply,
    pub model: String,
    pub usage: TokenUsage,
}

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Groq,
    XAI,
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Groq => "groq",
            Provider::XAI => "xai",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "groq" => Some(Provider::Groq),
            "xai" => Some(Provider::XAI),
            _ => None,
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::XAI => "XAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-3-7-sonnet-latest",
            Provider::OpenAI => "gpt-4o",
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::XAI => "grok-beta",
        }
    }
}

/// Error type
#[derive(Debug)]
pub struct Error {
    pub message: String,
    pub provider: String,
}

impl Error {
    pub fn new(provider: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for Error {}
