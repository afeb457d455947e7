//! # Application Layer
//!
//! Orchestration: the conversation controller, session prompt assembly and logging setup.

pub mod controller;
pub mod logging;
pub mod prompt;
