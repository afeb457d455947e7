//! # Well-known Paths
//!
//! Centralized definitions for default file locations and environment variable names.
//! Acts as the single source of truth for where config, prompt and log files live.

use std::path::PathBuf;

pub const CONFIG_FILE: &str = "reelsort.yaml";
pub const CONFIG_DIR_NAME: &str = "reelsort";
pub const USER_CONFIG_FILE: &str = "config.yaml";

pub const PROMPT_TEMPLATE: &str = "prompt/main.md";
pub const DOCS_DIR: &str = "prompt/jellyfin-docs";

pub const LOG_DIR: &str = "data";
pub const LOG_FILE: &str = "session.log";

pub const MOVIES_ENV: &str = "JELLYFIN_MOVIES_FOLDER";
pub const SHOWS_ENV: &str = "JELLYFIN_SHOWS_FOLDER";
pub const SOURCE_ENV: &str = "SOURCE_FOLDER";

/// Config files tried, in order, when none is given on the command line.
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(CONFIG_DIR_NAME).join(USER_CONFIG_FILE));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_directory_config_is_tried_first() {
        let candidates = default_config_candidates();
        assert_eq!(candidates[0], PathBuf::from("reelsort.yaml"));
    }
}
