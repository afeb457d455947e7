use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{Tool, ToolContext, ToolError, parse_input, schema_of};
use crate::sandbox::{PathSandbox, RootKind};
use crate::strings::prompts::LIST_DIRECTORY_DESCRIPTION;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDirectoryInput {
    /// Which library folder to list: "movies", "shows" or "source".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Path relative to the selected folder. Empty lists the folder itself.
    #[serde(default)]
    pub subpath: Option<String>,
    /// Absolute path to list instead of a folder type.
    #[serde(default)]
    pub path: Option<String>,
}

pub struct ListDirectoryTool {
    sandbox: Arc<PathSandbox>,
}

impl ListDirectoryTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &'static str {
        "list_directory"
    }

    fn description(&self) -> &'static str {
        LIST_DIRECTORY_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema_of::<ListDirectoryInput>()
    }

    async fn call(&self, input: Value, _ctx: &ToolContext) -> Result<String, ToolError> {
        let args: ListDirectoryInput = parse_input(input)?;

        let dir = match (&args.path, &args.kind) {
            (Some(path), _) if !path.trim().is_empty() => self.sandbox.resolve(path)?,
            (_, Some(kind)) => {
                let kind = RootKind::parse(kind).ok_or_else(|| {
                    ToolError::MalformedInput(format!(
                        "invalid type '{}': must be 'movies', 'shows' or 'source'",
                        kind
                    ))
                })?;
                self.sandbox
                    .resolve_under(kind, args.subpath.as_deref().unwrap_or(""))?
            }
            _ => {
                return Err(ToolError::MalformedInput(
                    "either 'type' or 'path' is required".to_string(),
                ));
            }
        };

        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| ToolError::io("failed to read directory", &dir, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ToolError::io("failed to read directory", &dir, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let line = match entry.metadata().await {
                Ok(meta) if meta.is_dir() => format!("{}/", name),
                Ok(meta) => format!("{} ({} bytes)", name, meta.len()),
                Err(_) => name.clone(),
            };
            entries.push((name, line));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(entries
            .into_iter()
            .map(|(_, line)| line + "\n")
            .collect())
    }
}
