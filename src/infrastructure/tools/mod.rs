//! # Tools Module
//!
//! In-process tools the model can call. Every path argument passes through the
//! [`PathSandbox`](crate::sandbox::PathSandbox) before any filesystem access.

pub mod copy_file;
pub mod executor;
pub mod list_directory;
pub mod read_file;
pub mod registry;
pub mod rename_media;
pub mod search_imdb;

use std::io;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::domain::types::ToolSpec;
use crate::infrastructure::interrupt::AbortSignal;
use crate::sandbox::SandboxError;

pub use executor::ToolExecutor;
pub use registry::{RegistryError, ToolRegistry};

/// Recoverable tool failure. The display text becomes the failure result payload.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("access denied: {0}")]
    Containment(#[from] SandboxError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("target path already exists: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    MalformedInput(String),
    #[error("cannot read image or video files: {0}")]
    BinaryMedia(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("cancelled")]
    Cancelled,
}

impl ToolError {
    /// Maps an I/O error on `path`, turning a missing entry into [`ToolError::NotFound`].
    pub fn io(context: impl Into<String>, path: &std::path::Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::NotFound(path.display().to_string())
        } else {
            ToolError::Io {
                context: format!("{} {}", context.into(), path.display()),
                source,
            }
        }
    }
}

/// Per-invocation state handed to a tool.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub abort: Option<AbortSignal>,
}

impl ToolContext {
    pub fn new(abort: AbortSignal) -> Self {
        Self { abort: Some(abort) }
    }

    pub fn check_abort(&self) -> Result<(), ToolError> {
        match &self.abort {
            Some(signal) if signal.is_aborted() => Err(ToolError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Runs `fut` to completion unless the abort signal fires first.
    pub async fn cancellable<F: std::future::Future>(&self, fut: F) -> Result<F::Output, ToolError> {
        match &self.abort {
            Some(signal) => tokio::select! {
                out = fut => Ok(out),
                _ = signal.aborted() => Err(ToolError::Cancelled),
            },
            None => Ok(fut.await),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the accepted arguments.
    fn input_schema(&self) -> Value;

    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Schema for a typed argument struct, without the draft and title headers.
pub fn schema_of<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| Value::Object(Default::default()));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    value
}

/// Parses raw arguments into the tool's typed input.
pub fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    // Models sometimes send `null` for tools with only optional fields.
    let input = if input.is_null() {
        Value::Object(Default::default())
    } else {
        input
    };
    serde_json::from_value(input).map_err(|e| ToolError::MalformedInput(e.to_string()))
}
