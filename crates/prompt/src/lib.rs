//! Staged prompt templates for inkpipe.
//!
//! This crate provides:
//! - Line-oriented parsing of `## Stage N` template documents
//! - A template store keyed by style name
//! - Single-brace placeholder substitution

pub mod loader;
pub mod parser;
pub mod render;
pub mod types;

// Re-export main types
pub use loader::TemplateStore;
pub use parser::{parse_document, parse_stages};
pub use render::{placeholders, render};
pub use types::{Stage, StageTemplate, TemplateDocument, SYSTEM_SUFFIX};
