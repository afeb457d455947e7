//! # Tool Executor
//!
//! Turns one model-issued [`ToolCall`] into exactly one [`ToolResult`]. Unknown names,
//! handler errors and handler panics all become failure-flagged results; nothing a tool
//! does can end the session.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::{ToolContext, ToolRegistry};
use crate::domain::types::{ToolCall, ToolResult};
use crate::strings::logs;

pub const TOOL_NOT_FOUND: &str = "tool not found";

#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        tracing::info!(tool = %call.name, args = %call.input, "{}", logs::TOOL_INVOKED);

        let Some(tool) = self.registry.get(&call.name) else {
            tracing::warn!(tool = %call.name, "{}", logs::TOOL_UNKNOWN);
            return ToolResult::failure(&call.id, TOOL_NOT_FOUND);
        };

        let outcome = AssertUnwindSafe(tool.call(call.input.clone(), ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(output)) => {
                tracing::debug!(tool = %call.name, bytes = output.len(), "{}", logs::TOOL_SUCCEEDED);
                ToolResult::success(&call.id, output)
            }
            Ok(Err(err)) => {
                tracing::warn!(tool = %call.name, error = %err, "{}", logs::TOOL_FAILED);
                ToolResult::failure(&call.id, err.to_string())
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(tool = %call.name, "{}: {}", logs::TOOL_PANICKED, message);
                ToolResult::failure(&call.id, format!("tool panicked: {}", message))
            }
        }
    }
}
