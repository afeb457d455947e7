//! # Session Prompt
//!
//! Builds the initial prompt: a template (file, or the built-in default) with
//! `{{Name}}` placeholders filled from the library roots, the input path and the
//! concatenated naming docs. The Go-template spelling `{{.Name}}` is accepted too.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::domain::config::PromptConfig;
use crate::sandbox::{PathSandbox, RootKind};
use crate::strings::{logs, prompts};

const PLACEHOLDER: &str = r"\{\{\s*\.?(\w+)\s*\}\}";

pub const INPUT_PATH: &str = "InputPath";
pub const MOVIES_FOLDER: &str = "MoviesFolder";
pub const SHOWS_FOLDER: &str = "ShowsFolder";
pub const SOURCE_FOLDER: &str = "SourceFolder";
pub const JELLYFIN_DOCS: &str = "JellyfinDocs";

/// A builder for rendering prompts with named values.
pub struct PromptRenderer<'a> {
    template: &'a str,
    values: HashMap<String, String>,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(template: &'a str) -> Self {
        Self {
            template,
            values: HashMap::new(),
        }
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Fails if the template names a placeholder that has no value.
    pub fn render(self) -> Result<String> {
        let re = Regex::new(PLACEHOLDER).context("Invalid placeholder pattern")?;

        let mut unknown: Vec<String> = Vec::new();
        let rendered = re.replace_all(self.template, |caps: &Captures| {
            let name = &caps[1];
            match self.values.get(name) {
                Some(value) => value.clone(),
                None => {
                    if !unknown.iter().any(|u| u == name) {
                        unknown.push(name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });

        if !unknown.is_empty() {
            bail!("Unknown prompt placeholder(s): {}", unknown.join(", "));
        }
        Ok(rendered.into_owned())
    }
}

/// Every `*.md` file under `dir`, recursively in path order, each followed by a newline.
/// A missing directory yields an empty string.
pub fn collect_docs(dir: &Path) -> Result<String> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "{}", logs::DOCS_MISSING);
        return Ok(String::new());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk docs directory {}", dir.display()))?;
        let is_md = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if entry.file_type().is_file() && is_md {
            files.push(entry.into_path());
        }
    }

    let mut docs = String::new();
    for file in files {
        let content = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read doc {}", file.display()))?;
        docs.push_str(&content);
        docs.push('\n');
    }
    Ok(docs)
}

/// Template file content, or the built-in template when the file does not exist.
pub fn load_template(path: &Path) -> Result<String> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "{}", logs::TEMPLATE_FALLBACK);
        return Ok(prompts::DEFAULT_TEMPLATE.to_string());
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt template {}", path.display()))
}

/// Renders the session prompt for organizing `input_path`.
pub fn build_initial_prompt(config: &PromptConfig, sandbox: &PathSandbox, input_path: &str) -> Result<String> {
    let template = load_template(&config.template)?;
    let docs = collect_docs(&config.docs_dir)?;

    let root = |kind: RootKind| {
        sandbox
            .root(kind)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not configured)".to_string())
    };

    PromptRenderer::new(&template)
        .set(INPUT_PATH, input_path)
        .set(MOVIES_FOLDER, root(RootKind::Movies))
        .set(SHOWS_FOLDER, root(RootKind::Shows))
        .set(SOURCE_FOLDER, root(RootKind::Source))
        .set(JELLYFIN_DOCS, docs)
        .render()
        .with_context(|| format!("Failed to render prompt template {}", config.template.display()))
}
