use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use super::{Tool, ToolContext, ToolError, parse_input, schema_of};
use crate::sandbox::PathSandbox;
use crate::strings::prompts::READ_FILE_DESCRIPTION;

/// Extensions the read tool refuses: images and video containers.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "tiff", "tif", "ico", "mp4", "avi", "mkv",
    "mov", "wmv", "flv", "webm", "m4v", "3gp", "ogv", "vob", "ts", "mts", "m2ts",
];

pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            MEDIA_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadFileInput {
    /// Absolute path of the file to read.
    pub path: String,
    /// Maximum number of bytes to read from the start of the file. 0 or omitted reads the whole file.
    #[serde(default)]
    pub bytes: Option<u64>,
}

pub struct ReadFileTool {
    sandbox: Arc<PathSandbox>,
}

impl ReadFileTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        READ_FILE_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema_of::<ReadFileInput>()
    }

    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: ReadFileInput = parse_input(input)?;
        let path = self.sandbox.resolve(&args.path)?;

        if is_media_file(&path) {
            return Err(ToolError::BinaryMedia(path.display().to_string()));
        }

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::io("failed to stat", &path, e))?;
        if meta.is_dir() {
            return Err(ToolError::MalformedInput(format!(
                "{} is a directory, use list_directory",
                path.display()
            )));
        }

        ctx.check_abort()?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| ToolError::io("failed to open", &path, e))?;

        let limit = args.bytes.unwrap_or(0);
        let read = async move {
            let mut buf = Vec::new();
            match limit {
                0 => {
                    let mut file = file;
                    file.read_to_end(&mut buf).await
                }
                limit => file.take(limit).read_to_end(&mut buf).await,
            }
            .map(|_| buf)
        };
        let buf = ctx
            .cancellable(read)
            .await?
            .map_err(|e| ToolError::io("failed to read", &path, e))?;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
