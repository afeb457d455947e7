use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{Tool, ToolContext, ToolError, parse_input, schema_of};
use crate::sandbox::PathSandbox;
use crate::strings::prompts::RENAME_MEDIA_DESCRIPTION;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RenameMediaInput {
    /// Absolute path of the file or folder to move.
    pub source_path: String,
    /// Absolute new path inside the movies or shows folder. Must not exist yet.
    pub target_path: String,
}

pub struct RenameMediaTool {
    sandbox: Arc<PathSandbox>,
}

impl RenameMediaTool {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for RenameMediaTool {
    fn name(&self) -> &'static str {
        "rename_jellyfin_media"
    }

    fn description(&self) -> &'static str {
        RENAME_MEDIA_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema_of::<RenameMediaInput>()
    }

    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: RenameMediaInput = parse_input(input)?;
        let source = self.sandbox.resolve(&args.source_path)?;
        let target = self.sandbox.resolve_destination(&args.target_path)?;

        if self.sandbox.roots().any(|(_, root)| root == source) {
            return Err(ToolError::MalformedInput(format!(
                "{} is a library folder and cannot be moved",
                source.display()
            )));
        }

        let meta = tokio::fs::symlink_metadata(&source)
            .await
            .map_err(|e| ToolError::io("failed to stat", &source, e))?;

        // Nothing may be created before this check.
        match tokio::fs::symlink_metadata(&target).await {
            Ok(_) => return Err(ToolError::Conflict(target.display().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ToolError::io("failed to stat", &target, e)),
        }

        if target.starts_with(&source) {
            return Err(ToolError::MalformedInput(format!(
                "cannot move {} into itself",
                source.display()
            )));
        }

        ctx.check_abort()?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io("failed to create directory", parent, e))?;
        }

        match tokio::fs::rename(&source, &target).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices && meta.is_file() => {
                tracing::debug!("Cross-device move, falling back to copy and remove");
                tokio::fs::copy(&source, &target)
                    .await
                    .map_err(|e| ToolError::io("failed to copy", &source, e))?;
                tokio::fs::remove_file(&source)
                    .await
                    .map_err(|e| ToolError::io("failed to remove", &source, e))?;
            }
            Err(e) => return Err(ToolError::io("failed to move", &source, e)),
        }

        Ok(format!(
            "Successfully moved/renamed {} to {}",
            source.display(),
            target.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::RootKind;
    use serde_json::json;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, RenameMediaTool) {
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
        (tmp, base, RenameMediaTool::new(Arc::new(sandbox)))
    }

    fn args(from: &Path, to: &Path) -> Value {
        json!({"source_path": from.to_string_lossy(), "target_path": to.to_string_lossy()})
    }

    #[tokio::test]
    async fn test_move_is_exactly_once() {
        let (_tmp, base, tool) = setup();
        let src = base.join("movies/film.mkv");
        fs::write(&src, "film").unwrap();
        let dst = base.join("movies/Film (2020)/Film (2020).mkv");

        let out = tool.call(args(&src, &dst), &ToolContext::default()).await.unwrap();
        assert!(out.starts_with("Successfully moved/renamed"));
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "film");

        // Second attempt: source is gone.
        let err = tool.call(args(&src, &dst), &ToolContext::default()).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_existing_target_is_conflict_and_nothing_changes() {
        let (_tmp, base, tool) = setup();
        let src = base.join("shows/a.mkv");
        let dst = base.join("shows/b.mkv");
        fs::write(&src, "a").unwrap();
        fs::write(&dst, "b").unwrap();

        let err = tool.call(args(&src, &dst), &ToolContext::default()).await.unwrap_err();
        assert!(matches!(err, ToolError::Conflict(_)));
        assert!(err.to_string().contains("target path already exists"));
        assert_eq!(fs::read_to_string(&src).unwrap(), "a");
        assert_eq!(fs::read_to_string(&dst).unwrap(), "b");
    }

    #[tokio::test]
    async fn test_missing_source_creates_no_directories() {
        let (_tmp, base, tool) = setup();
        let dst = base.join("movies/New Folder/x.mkv");
        let err = tool
            .call(args(&base.join("movies/none.mkv"), &dst), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(!base.join("movies/New Folder").exists());
    }

    #[tokio::test]
    async fn test_traversal_is_rejected_before_touching_anything() {
        let (_tmp, base, tool) = setup();
        let input = json!({
            "source_path": format!("{}/movies/../../etc/passwd", base.display()),
            "target_path": base.join("movies/x").to_string_lossy(),
        });
        let err = tool.call(input, &ToolContext::default()).await.unwrap_err();
        assert!(matches!(err, ToolError::Containment(_)));
        assert!(!base.join("movies/x").exists());
    }

    #[tokio::test]
    async fn test_moves_from_scan_folder_into_library() {
        let (_tmp, base, tool) = setup();
        let src = base.join("scan/Show S01E01.mkv");
        fs::write(&src, "ep").unwrap();
        let dst = base.join("shows/Show/Season 01/Show S01E01.mkv");

        tool.call(args(&src, &dst), &ToolContext::default()).await.unwrap();
        assert!(dst.exists());
        assert!(!src.exists());
    }

    #[tokio::test]
    async fn test_root_folder_cannot_be_moved() {
        let (_tmp, base, tool) = setup();
        let err = tool
            .call(args(&base.join("scan"), &base.join("movies/scan")), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MalformedInput(_)));
        assert!(base.join("scan").is_dir());
    }

    #[tokio::test]
    async fn test_folder_cannot_move_into_itself() {
        let (_tmp, base, tool) = setup();
        let src = base.join("movies/A");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.mkv"), "a").unwrap();

        let err = tool
            .call(args(&src, &src.join("sub/B")), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MalformedInput(_)));
        assert!(!src.join("sub").exists());
        assert_eq!(fs::read_to_string(src.join("a.mkv")).unwrap(), "a");
    }

    #[tokio::test]
    async fn test_target_outside_library_is_rejected() {
        let (_tmp, base, tool) = setup();
        let src = base.join("movies/a.mkv");
        fs::write(&src, "a").unwrap();
        let err = tool
            .call(args(&src, &base.join("scan/a.mkv")), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Containment(_)));
        assert!(src.exists());
    }
}
