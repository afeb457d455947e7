//! # Strings Module
//!
//! Centralizes operator-facing strings, log lines, tool descriptions and the default prompt.

pub mod logs;
pub mod messages;
pub mod prompts;
