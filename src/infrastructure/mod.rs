//! # Infrastructure Layer
//!
//! Handles interactions with external systems: model APIs, the terminal, the filesystem
//! tools and the interrupt signal. Implements the traits defined in the Domain layer
//! (`LlmProvider`, `Operator`).

pub mod interrupt;
pub mod llm;
pub mod terminal;
pub mod tools;
