//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`reelsort.yaml`).
//! Defines the structs for library roots, the model agent, prompt sources and logging.
//!
//! The file is optional; library roots may come entirely from the environment
//! (`JELLYFIN_MOVIES_FOLDER`, `JELLYFIN_SHOWS_FOLDER`, `SOURCE_FOLDER`), which always
//! takes precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::paths;

/// Main application configuration structure.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// The directories the tools are allowed to touch.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct LibraryConfig {
    #[serde(default)]
    pub movies: Option<PathBuf>,
    #[serde(default)]
    pub shows: Option<PathBuf>,
    /// Optional scan folder that new media is picked up from.
    #[serde(default)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>, // e.g. "ANTHROPIC_API_KEY"
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Request timeout in seconds. No timeout when unset.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            endpoint: None,
            api_key: None,
            api_key_env: None,
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout: None,
        }
    }
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            docs_dir: default_docs_dir(),
        }
    }
}

fn default_template() -> PathBuf {
    PathBuf::from(paths::PROMPT_TEMPLATE)
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from(paths::DOCS_DIR)
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_log_file")]
    pub file: String,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            file: default_log_file(),
            filter: default_filter(),
            console: default_console(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(paths::LOG_DIR)
}

fn default_log_file() -> String {
    paths::LOG_FILE.to_string()
}

fn default_filter() -> String {
    "warn,reelsort=info".to_string()
}

fn default_console() -> bool {
    true
}

impl AppConfig {
    /// Loads the configuration from `explicit` (which must exist) or from the first
    /// default location that exists, then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => paths::default_config_candidates()
                .into_iter()
                .find(|p| p.is_file()),
        };
        let mut config = match &path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.source = path;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a struct with defaults.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Non-empty environment values replace the corresponding library roots.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        if let Some(movies) = get(paths::MOVIES_ENV) {
            self.library.movies = Some(movies);
        }
        if let Some(shows) = get(paths::SHOWS_ENV) {
            self.library.shows = Some(shows);
        }
        if let Some(source) = get(paths::SOURCE_ENV) {
            self.library.source = Some(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
library:
  movies: /lib/movies
  shows: /lib/shows
  source: /scan
agent:
  provider: openai
  model: gpt-4o
  api_key_env: OPENAI_API_KEY
  max_tokens: 2048
logging:
  console: false
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.library.movies, Some(PathBuf::from("/lib/movies")));
        assert_eq!(config.library.source, Some(PathBuf::from("/scan")));
        assert_eq!(config.agent.provider, "openai");
        assert_eq!(config.agent.max_tokens, 2048);
        assert!(!config.logging.console);
        assert_eq!(config.logging.file, "session.log");
        assert_eq!(config.prompt.template, PathBuf::from("prompt/main.md"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.agent.provider, "anthropic");
        assert_eq!(config.agent.max_tokens, 1024);
        assert!(config.library.movies.is_none());
    }

    #[test]
    fn test_env_overrides_library_roots() {
        let mut config = AppConfig::from_yaml("library:\n  movies: /from/file\n").unwrap();
        let env: HashMap<&str, &str> = [
            ("JELLYFIN_MOVIES_FOLDER", "/from/env"),
            ("JELLYFIN_SHOWS_FOLDER", "/shows"),
            ("SOURCE_FOLDER", "  "),
        ]
        .into_iter()
        .collect();

        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.library.movies, Some(PathBuf::from("/from/env")));
        assert_eq!(config.library.shows, Some(PathBuf::from("/shows")));
        assert!(config.library.source.is_none());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = AppConfig::from_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
