//! # LLM Wrapper
//!
//! Unified tool-use interface over the supported model APIs (Anthropic, and the
//! OpenAI-compatible OpenAI, Groq and xAI endpoints).
//!
//! The [`Client`] implements [`LlmProvider`](crate::domain::traits::LlmProvider): it maps
//! the turn history onto provider wire messages, publishes the tool specs, and maps the
//! reply back into ordered text and tool-call blocks.

mod client;
pub mod providers;
mod types;

pub use client::Client;

pub use types::{Block, Context, Error, MessageRole, Provider, Response, TokenUsage};
