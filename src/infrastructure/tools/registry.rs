//! # Tool Registry
//!
//! Fixed name → tool mapping built once at startup. Construction rejects duplicate
//! names and input schemas that are not self-consistent; after that the registry is
//! read-only and shared by reference.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::Tool;
use super::copy_file::CopyFileTool;
use super::list_directory::ListDirectoryTool;
use super::read_file::ReadFileTool;
use super::rename_media::RenameMediaTool;
use super::search_imdb::SearchImdbTool;
use crate::domain::types::ToolSpec;
use crate::sandbox::PathSandbox;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is registered more than once")]
    DuplicateName(String),
    #[error("tool '{tool}' has an invalid input schema: {reason}")]
    InvalidSchema { tool: String, reason: String },
}

pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<&'static str, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self, RegistryError> {
        let mut index = HashMap::new();
        for (i, tool) in tools.iter().enumerate() {
            validate_schema(tool.name(), &tool.input_schema())?;
            if index.insert(tool.name(), i).is_some() {
                return Err(RegistryError::DuplicateName(tool.name().to_string()));
            }
        }
        Ok(Self { tools, index })
    }

    /// The five standard tools: four sandboxed file tools plus the IMDb lookup.
    pub fn standard(sandbox: Arc<PathSandbox>, lookup: SearchImdbTool) -> Result<Self, RegistryError> {
        Self::new(vec![
            Arc::new(ReadFileTool::new(sandbox.clone())),
            Arc::new(ListDirectoryTool::new(sandbox.clone())),
            Arc::new(CopyFileTool::new(sandbox.clone())),
            Arc::new(RenameMediaTool::new(sandbox)),
            Arc::new(lookup),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Published tool surface, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// An input schema must describe an object, and every required field must be declared.
fn validate_schema(tool: &str, schema: &Value) -> Result<(), RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidSchema {
        tool: tool.to_string(),
        reason: reason.to_string(),
    };

    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err(invalid("top-level type must be \"object\""));
    }
    let properties = match schema.get("properties") {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => return Err(invalid("\"properties\" must be an object")),
    };

    match schema.get("required") {
        None => Ok(()),
        Some(Value::Array(required)) => {
            for field in required {
                let name = field
                    .as_str()
                    .ok_or_else(|| invalid("\"required\" entries must be strings"))?;
                if !properties.is_some_and(|p| p.contains_key(name)) {
                    return Err(invalid(&format!("required field '{}' is not declared", name)));
                }
            }
            Ok(())
        }
        Some(_) => Err(invalid("\"required\" must be an array")),
    }
}
