//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the application.
//! Independent of specific frameworks (mostly), serving as the contract for other layers.

pub mod config;
pub mod conversation;
pub mod paths;
pub mod traits;
pub mod types;
