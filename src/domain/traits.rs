//! # Domain Traits
//!
//! Abstract interfaces for the components the conversation loop talks to (model, operator).
//! Allows for pluggable implementations in the Infrastructure layer and scripted ones in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::conversation::Conversation;
use crate::domain::types::{ModelReply, ToolSpec};

/// Abstract interface for an LLM Provider that supports tool use
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Produce the next reply for the full conversation, given the published tools.
    async fn respond(&self, conversation: &Conversation, tools: &[ToolSpec]) -> Result<ModelReply>;
}

/// Abstract interface for the human driving the session (e.g. a terminal)
#[async_trait]
pub trait Operator: Send {
    /// Read one line of operator text. `None` means the input stream has ended.
    async fn read_line(&mut self) -> Result<Option<String>>;

    /// Show model text to the operator
    async fn show_reply(&mut self, text: &str) -> Result<()>;

    /// Show that a tool is about to run, with its raw arguments
    async fn show_tool_call(&mut self, name: &str, args: &str) -> Result<()>;

    /// Show a status line (not part of the conversation)
    async fn notify(&mut self, text: &str) -> Result<()>;
}
