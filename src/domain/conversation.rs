//! # Conversation
//!
//! Append-only turn history. Enforces the pairing rule: every tool call issued by the
//! model is answered by exactly one result, in a single batch, before anything else
//! is appended.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::types::{ModelReply, ReplyBlock, ToolCall, ToolResult, Turn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("{0} tool call(s) are still waiting for results")]
    PendingToolCalls(usize),
    #[error("no tool calls are waiting for results")]
    NothingPending,
    #[error("tool call '{0}' has no result")]
    MissingResult(String),
    #[error("result '{0}' does not answer a pending tool call")]
    UnmatchedResult(String),
    #[error("tool call '{0}' was answered more than once")]
    DuplicateResult(String),
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Tool calls issued since the last result batch or operator turn.
    pub fn pending_calls(&self) -> Vec<&ToolCall> {
        let start = self
            .turns
            .iter()
            .rposition(|turn| matches!(turn, Turn::ToolResults(_) | Turn::Operator(_)))
            .map_or(0, |idx| idx + 1);

        self.turns[start..]
            .iter()
            .filter_map(|turn| match turn {
                Turn::ModelToolCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// True when the history may be sent to the model.
    pub fn is_ready_for_model(&self) -> bool {
        self.pending_calls().is_empty()
    }

    pub fn push_operator(&mut self, text: impl Into<String>) -> Result<(), ConversationError> {
        self.ensure_nothing_pending()?;
        self.turns.push(Turn::Operator(text.into()));
        Ok(())
    }

    /// Appends every block of a model reply as its own turn.
    pub fn push_reply(&mut self, reply: &ModelReply) -> Result<(), ConversationError> {
        self.ensure_nothing_pending()?;
        for block in &reply.blocks {
            self.turns.push(match block {
                ReplyBlock::Text(text) => Turn::ModelText(text.clone()),
                ReplyBlock::ToolCall(call) => Turn::ModelToolCall(call.clone()),
            });
        }
        Ok(())
    }

    /// Appends the result batch for the pending tool calls. The batch must answer each
    /// pending call exactly once; order does not matter.
    pub fn push_tool_results(&mut self, results: Vec<ToolResult>) -> Result<(), ConversationError> {
        let pending: HashSet<&str> = self
            .pending_calls()
            .into_iter()
            .map(|call| call.id.as_str())
            .collect();
        if pending.is_empty() {
            return Err(ConversationError::NothingPending);
        }

        let mut answered = HashSet::new();
        for result in &results {
            if !pending.contains(result.call_id.as_str()) {
                return Err(ConversationError::UnmatchedResult(result.call_id.clone()));
            }
            if !answered.insert(result.call_id.as_str()) {
                return Err(ConversationError::DuplicateResult(result.call_id.clone()));
            }
        }
        if let Some(missing) = pending.iter().find(|id| !answered.contains(*id)) {
            return Err(ConversationError::MissingResult((*missing).to_string()));
        }

        self.turns.push(Turn::ToolResults(results));
        Ok(())
    }

    fn ensure_nothing_pending(&self) -> Result<(), ConversationError> {
        match self.pending_calls().len() {
            0 => Ok(()),
            n => Err(ConversationError::PendingToolCalls(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply_with_calls(ids: &[&str]) -> ModelReply {
        let mut blocks = vec![ReplyBlock::Text("working".into())];
        for id in ids {
            blocks.push(ReplyBlock::ToolCall(ToolCall::new(*id, "list_directory", json!({}))));
        }
        ModelReply::new(blocks)
    }

    #[test]
    fn test_reply_turns_are_appended_in_order() {
        let mut convo = Conversation::new();
        convo.push_operator("hello").unwrap();
        convo.push_reply(&reply_with_calls(&["t1"])).unwrap();

        assert_eq!(convo.len(), 3);
        assert!(matches!(convo.turns()[1], Turn::ModelText(_)));
        assert!(matches!(convo.turns()[2], Turn::ModelToolCall(_)));
        assert!(!convo.is_ready_for_model());
    }

    #[test]
    fn test_results_in_any_order_close_the_batch() {
        let mut convo = Conversation::new();
        convo.push_operator("go").unwrap();
        convo.push_reply(&reply_with_calls(&["a", "b"])).unwrap();
        convo
            .push_tool_results(vec![ToolResult::success("b", "ok"), ToolResult::failure("a", "no")])
            .unwrap();

        assert!(convo.is_ready_for_model());
        assert_eq!(convo.len(), 5);
    }

    #[test]
    fn test_missing_result_is_rejected() {
        let mut convo = Conversation::new();
        convo.push_reply(&reply_with_calls(&["a", "b"])).unwrap();
        let err = convo
            .push_tool_results(vec![ToolResult::success("a", "ok")])
            .unwrap_err();
        assert_eq!(err, ConversationError::MissingResult("b".into()));
        assert!(!convo.is_ready_for_model());
    }

    #[test]
    fn test_duplicate_and_unknown_results_are_rejected() {
        let mut convo = Conversation::new();
        convo.push_reply(&reply_with_calls(&["a"])).unwrap();

        let dup = convo.push_tool_results(vec![
            ToolResult::success("a", "1"),
            ToolResult::success("a", "2"),
        ]);
        assert_eq!(dup, Err(ConversationError::DuplicateResult("a".into())));

        let unknown = convo.push_tool_results(vec![ToolResult::success("zzz", "1")]);
        assert_eq!(unknown, Err(ConversationError::UnmatchedResult("zzz".into())));
    }

    #[test]
    fn test_operator_cannot_interrupt_pending_calls() {
        let mut convo = Conversation::new();
        convo.push_reply(&reply_with_calls(&["a"])).unwrap();
        assert_eq!(
            convo.push_operator("hey"),
            Err(ConversationError::PendingToolCalls(1))
        );
    }

    #[test]
    fn test_results_without_calls_are_rejected() {
        let mut convo = Conversation::new();
        convo.push_operator("hi").unwrap();
        assert_eq!(
            convo.push_tool_results(vec![]),
            Err(ConversationError::NothingPending)
        );
    }
}
