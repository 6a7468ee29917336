// src/core/mod.rs

//! The engine: everything between the raw argument vector and the rendered Markdown.

pub mod aliases;
pub mod content_filter;
pub mod discovery;
pub mod expander;
pub mod grammar;
pub mod line_window;
pub mod markdown;
pub mod patterns;
pub mod templates;
