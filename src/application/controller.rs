//! # Conversation Controller
//!
//! Runs the turn-taking loop: operator input → model → tool dispatch → model → ...
//! until the operator's input ends.
//!
//! The loop is strictly sequential. Every tool call in a model reply gets exactly one
//! result, and the whole batch is appended before the model is called again. Model and
//! tool failures are surfaced as ordinary output; only operator I/O failures end the run
//! with an error.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::conversation::Conversation;
use crate::domain::traits::{LlmProvider, Operator};
use crate::domain::types::{ReplyBlock, ToolCall, ToolResult, ToolSpec};
use crate::infrastructure::interrupt::AbortSignal;
use crate::infrastructure::tools::{ToolContext, ToolExecutor};
use crate::strings::{logs, messages};

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    AwaitingOperatorInput,
    AwaitingModelResponse,
    DispatchingTools(Vec<ToolCall>),
    Finished,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::AwaitingOperatorInput => f.write_str("AwaitingOperatorInput"),
            State::AwaitingModelResponse => f.write_str("AwaitingModelResponse"),
            State::DispatchingTools(calls) => write!(f, "DispatchingTools({})", calls.len()),
            State::Finished => f.write_str("Finished"),
        }
    }
}

pub struct ConversationController<O: Operator> {
    model: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    tools: Vec<ToolSpec>,
    operator: O,
    abort: AbortSignal,
    conversation: Conversation,
}

impl<O: Operator> ConversationController<O> {
    pub fn new(model: Arc<dyn LlmProvider>, executor: ToolExecutor, operator: O, abort: AbortSignal) -> Self {
        let tools = executor.registry().specs();
        Self {
            model,
            executor,
            tools,
            operator,
            abort,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[cfg(test)]
    pub fn operator(&self) -> &O {
        &self.operator
    }

    /// Runs until the operator's input ends. A seeded prompt skips the first read.
    pub async fn run(&mut self, initial_prompt: Option<String>) -> Result<()> {
        let mut state = match initial_prompt {
            Some(prompt) => {
                self.conversation.push_operator(prompt)?;
                State::AwaitingModelResponse
            }
            None => State::AwaitingOperatorInput,
        };

        while state != State::Finished {
            let next = self.step(state.clone()).await?;
            tracing::debug!("{}", logs::state_change(&state.to_string(), &next.to_string()));
            state = next;
        }
        Ok(())
    }

    async fn step(&mut self, state: State) -> Result<State> {
        match state {
            State::AwaitingOperatorInput => self.read_operator().await,
            State::AwaitingModelResponse => self.ask_model().await,
            State::DispatchingTools(calls) => self.dispatch(calls).await,
            State::Finished => Ok(State::Finished),
        }
    }

    async fn read_operator(&mut self) -> Result<State> {
        // Control is back with the operator; a stale interrupt must not end the session.
        self.abort.reset();

        let line = tokio::select! {
            line = self.operator.read_line() => line?,
            _ = self.abort.aborted() => None,
        };

        match line {
            None => {
                tracing::info!("{}", logs::INPUT_CLOSED);
                Ok(State::Finished)
            }
            Some(text) if text.trim().is_empty() => Ok(State::AwaitingOperatorInput),
            Some(text) => {
                self.conversation.push_operator(text)?;
                Ok(State::AwaitingModelResponse)
            }
        }
    }

    async fn ask_model(&mut self) -> Result<State> {
        debug_assert!(self.conversation.is_ready_for_model());
        let outcome = tokio::select! {
            reply = self.model.respond(&self.conversation, &self.tools) => Some(reply),
            _ = self.abort.aborted() => None,
        };

        let mut reply = match outcome {
            None => {
                tracing::warn!("{}", logs::MODEL_ABANDONED);
                self.operator.notify(messages::MODEL_INTERRUPTED).await?;
                return Ok(State::AwaitingOperatorInput);
            }
            Some(Err(err)) => {
                tracing::warn!("{}", logs::model_failed(&format!("{:#}", err)));
                self.operator
                    .notify(&messages::model_error(&format!("{:#}", err)))
                    .await?;
                return Ok(State::AwaitingOperatorInput);
            }
            Some(Ok(reply)) => reply,
        };

        let renamed = reply.ensure_unique_call_ids();
        if renamed > 0 {
            tracing::warn!(renamed, "{}", logs::CALL_IDS_REWRITTEN);
        }
        self.conversation.push_reply(&reply)?;

        let mut calls = Vec::new();
        for block in reply.blocks {
            match block {
                ReplyBlock::Text(text) if !text.trim().is_empty() => {
                    self.operator.show_reply(&text).await?;
                }
                ReplyBlock::Text(_) => {}
                ReplyBlock::ToolCall(call) => calls.push(call),
            }
        }

        if calls.is_empty() {
            Ok(State::AwaitingOperatorInput)
        } else {
            Ok(State::DispatchingTools(calls))
        }
    }

    async fn dispatch(&mut self, calls: Vec<ToolCall>) -> Result<State> {
        let ctx = ToolContext::new(self.abort.clone());
        let mut results = Vec::with_capacity(calls.len());

        for call in &calls {
            if self.abort.is_aborted() {
                results.push(ToolResult::failure(&call.id, messages::CANCELLED_RESULT));
                continue;
            }
            self.operator
                .show_tool_call(&call.name, &call.input.to_string())
                .await?;
            results.push(self.executor.execute(call, &ctx).await);
        }

        self.conversation.push_tool_results(results)?;

        if self.abort.is_aborted() {
            tracing::warn!("{}", logs::BATCH_CANCELLED);
            self.operator.notify(messages::TOOLS_INTERRUPTED).await?;
            Ok(State::AwaitingOperatorInput)
        } else {
            Ok(State::AwaitingModelResponse)
        }
    }
}
