//! # Domain Types
//!
//! Data structures shared by the conversation loop, the model providers and the tools.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model-issued request to run a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque correlation id chosen by the model.
    pub id: String,
    pub name: String,
    /// Raw argument payload, parsed by the tool itself.
    pub input: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// The answer to exactly one [`ToolCall`], correlated by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn failure(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// The declared surface of one tool as published to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One block of a model reply, in the order the model produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBlock {
    Text(String),
    ToolCall(ToolCall),
}

/// A complete model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub blocks: Vec<ReplyBlock>,
    pub stop_reason: Option<String>,
}

impl ModelReply {
    pub fn new(blocks: Vec<ReplyBlock>) -> Self {
        Self {
            blocks,
            stop_reason: None,
        }
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.blocks.iter().filter_map(|block| match block {
            ReplyBlock::ToolCall(call) => Some(call),
            ReplyBlock::Text(_) => None,
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls().next().is_some()
    }

    /// Replaces empty and repeated call ids with fresh `call_N` ids so every call can be
    /// answered on its own. The first use of an id keeps it. Returns the number replaced.
    pub fn ensure_unique_call_ids(&mut self) -> usize {
        let taken: HashSet<String> = self.tool_calls().map(|call| call.id.clone()).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut counter = 0usize;
        let mut replaced = 0;

        for block in &mut self.blocks {
            let ReplyBlock::ToolCall(call) = block else {
                continue;
            };
            if !call.id.is_empty() && seen.insert(call.id.clone()) {
                continue;
            }
            let fresh = loop {
                counter += 1;
                let candidate = format!("call_{counter}");
                if !taken.contains(&candidate) && !seen.contains(&candidate) {
                    break candidate;
                }
            };
            seen.insert(fresh.clone());
            call.id = fresh;
            replaced += 1;
        }
        replaced
    }
}

/// One atomic unit of conversation history.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    Operator(String),
    ModelText(String),
    ModelToolCall(ToolCall),
    /// All results for one model reply, appended together.
    ToolResults(Vec<ToolResult>),
}

impl Turn {
    /// Whether the turn is authored by the model side of the exchange.
    pub fn is_model(&self) -> bool {
        matches!(self, Turn::ModelText(_) | Turn::ModelToolCall(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_tool_calls_preserve_order() {
        let reply = ModelReply::new(vec![
            ReplyBlock::Text("looking".into()),
            ReplyBlock::ToolCall(ToolCall::new("a", "list_directory", json!({}))),
            ReplyBlock::ToolCall(ToolCall::new("b", "read_file", json!({"path": "/x"}))),
        ]);
        let ids: Vec<&str> = reply.tool_calls().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(reply.has_tool_calls());
    }

    #[test]
    fn test_repeated_and_empty_call_ids_are_replaced() {
        let mut reply = ModelReply::new(vec![
            ReplyBlock::ToolCall(ToolCall::new("dup", "list_directory", json!({}))),
            ReplyBlock::Text("and".into()),
            ReplyBlock::ToolCall(ToolCall::new("dup", "list_directory", json!({}))),
            ReplyBlock::ToolCall(ToolCall::new("", "read_file", json!({}))),
            ReplyBlock::ToolCall(ToolCall::new("call_1", "read_file", json!({}))),
        ]);

        assert_eq!(reply.ensure_unique_call_ids(), 2);
        let ids: Vec<&str> = reply.tool_calls().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["dup", "call_2", "call_3", "call_1"]);
    }

    #[test]
    fn test_unique_call_ids_are_left_alone() {
        let mut reply = ModelReply::new(vec![
            ReplyBlock::ToolCall(ToolCall::new("a", "list_directory", json!({}))),
            ReplyBlock::ToolCall(ToolCall::new("b", "list_directory", json!({}))),
        ]);
        assert_eq!(reply.ensure_unique_call_ids(), 0);
        let ids: Vec<&str> = reply.tool_calls().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_text_only_reply_has_no_tool_calls() {
        let reply = ModelReply::new(vec![ReplyBlock::Text("done".into())]);
        assert!(!reply.has_tool_calls());
    }
}
