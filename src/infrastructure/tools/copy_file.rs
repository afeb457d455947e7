use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Tool, ToolContext, ToolError, parse_input, schema_of};
use crate::sandbox::PathSandbox;
use crate::strings::prompts::COPY_FILE_DESCRIPTION;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CopyFileInput {
    /// Absolute path of the file to copy.
    pub initial_path: String,
    /// Absolute destination path inside the movies or shows folder.
    pub ending_path: String,
}

pub struct CopyFileTool {
    sandbox: Arc<PathSandbox>,
}

impl CopyFileTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for CopyFileTool {
    fn name(&self) -> &'static str {
        "copy_file"
    }

    fn description(&self) -> &'static str {
        COPY_FILE_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema_of::<CopyFileInput>()
    }

    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: CopyFileInput = parse_input(input)?;
        let source = self.sandbox.resolve(&args.initial_path)?;
        let destination = self.sandbox.resolve_destination(&args.ending_path)?;

        let meta = tokio::fs::metadata(&source)
            .await
            .map_err(|e| ToolError::io("failed to stat", &source, e))?;
        if meta.is_dir() {
            return Err(ToolError::MalformedInput(format!(
                "{} is a directory; only files can be copied",
                source.display()
            )));
        }
        if source == destination {
            return Err(ToolError::Conflict(format!(
                "{} is both source and destination",
                destination.display()
            )));
        }
        if tokio::fs::metadata(&destination)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(ToolError::MalformedInput(format!(
                "destination {} is a directory; give the full file path",
                destination.display()
            )));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io("failed to create directory", parent, e))?;
        }

        match copy_chunked(&source, &destination, ctx).await {
            Err(ToolError::Cancelled) => {
                let _ = tokio::fs::remove_file(&destination).await;
                tracing::warn!(dest = %destination.display(), "Copy cancelled, partial file removed");
                Err(ToolError::Cancelled)
            }
            Err(e) => Err(e),
            Ok(bytes) => {
                tracing::debug!(bytes, "Copied {} -> {}", source.display(), destination.display());
                Ok(format!(
                    "Successfully copied file from {} to {}",
                    source.display(),
                    destination.display()
                ))
            }
        }
    }
}

/// Streams `source` into a freshly created `destination`, checking for abort between chunks.
async fn copy_chunked(source: &Path, destination: &Path, ctx: &ToolContext) -> Result<u64, ToolError> {
    let mut reader = tokio::fs::File::open(source)
        .await
        .map_err(|e| ToolError::io("failed to open", source, e))?;
    let mut writer = tokio::fs::File::create(destination)
        .await
        .map_err(|e| ToolError::io("failed to create", destination, e))?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        ctx.check_abort()?;
        let n = reader
            .read(&mut buf)
            .await
            .map_err(|e| ToolError::io("failed to read", source, e))?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .await
            .map_err(|e| ToolError::io("failed to write", destination, e))?;
        total += n as u64;
    }
    writer
        .flush()
        .await
        .map_err(|e| ToolError::io("failed to write", destination, e))?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::interrupt::AbortSignal;
    use crate::sandbox::RootKind;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, CopyFileTool) {
        let tmp = TempDir::new().unwrap();
        let base = fs::canonicalize(tmp.path()).unwrap();
        for dir in ["movies", "shows", "scan"] {
            fs::create_dir_all(base.join(dir)).unwrap();
        }
        let sandbox = PathSandbox::new([
            (RootKind::Movies, base.join("movies")),
            (RootKind::Shows, base.join("shows")),
            (RootKind::Source, base.join("scan")),
        ])
        .unwrap();
        (tmp, base, CopyFileTool::new(Arc::new(sandbox)))
    }

    fn args(from: &Path, to: &Path) -> Value {
        json!({"initial_path": from.to_string_lossy(), "ending_path": to.to_string_lossy()})
    }

    #[tokio::test]
    async fn test_copy_creates_parents_and_preserves_bytes() {
        let (_tmp, base, tool) = setup();
        let src = base.join("scan/Film.mkv");
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &content).unwrap();
        let dst = base.join("movies/Film (2020) [tt0000001]/Film.mkv");

        let out = tool.call(args(&src, &dst), &ToolContext::default()).await.unwrap();

        assert_eq!(fs::read(&dst).unwrap(), content);
        assert_eq!(fs::read(&src).unwrap(), content);
        assert!(out.contains(&src.display().to_string()));
        assert!(out.contains(&dst.display().to_string()));
    }

    #[tokio::test]
    async fn test_copy_overwrites_existing_destination() {
        let (_tmp, base, tool) = setup();
        let src = base.join("scan/a.srt");
        let dst = base.join("movies/a.srt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old and longer").unwrap();

        tool.call(args(&src, &dst), &ToolContext::default()).await.unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_copy_onto_itself_is_conflict() {
        let (_tmp, base, tool) = setup();
        let file = base.join("movies/a.srt");
        fs::write(&file, "x").unwrap();

        let err = tool.call(args(&file, &file), &ToolContext::default()).await.unwrap_err();
        assert!(matches!(err, ToolError::Conflict(_)));
        assert_eq!(fs::read_to_string(&file).unwrap(), "x");
    }

    #[tokio::test]
    async fn test_destination_in_scan_folder_is_rejected() {
        let (_tmp, base, tool) = setup();
        let src = base.join("movies/a.srt");
        fs::write(&src, "x").unwrap();

        let err = tool
            .call(args(&src, &base.join("scan/a.srt")), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Containment(_)));
        assert!(!base.join("scan/a.srt").exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_not_found() {
        let (_tmp, base, tool) = setup();
        let err = tool
            .call(
                args(&base.join("scan/missing.mkv"), &base.join("movies/x.mkv")),
                &ToolContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(!base.join("movies/x.mkv").exists());
    }

    #[tokio::test]
    async fn test_aborted_copy_is_cancelled_and_cleaned_up() {
        let (_tmp, base, tool) = setup();
        let src = base.join("scan/big.mkv");
        fs::write(&src, vec![7u8; 3 * CHUNK_SIZE]).unwrap();
        let dst = base.join("movies/big.mkv");

        let signal = AbortSignal::new();
        signal.trigger();
        let err = tool
            .call(args(&src, &dst), &ToolContext::new(signal))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Cancelled));
        assert!(!dst.exists());
        assert!(src.exists());
    }
}
