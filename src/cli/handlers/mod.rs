// src/cli/handlers/mod.rs

/// State and helpers shared by the handlers.
pub mod commons;
/// `export`.
pub mod export;
/// The default command: files as Markdown sections.
pub mod find_files;
/// `help` and the help topics.
pub mod help;
/// `run`.
pub mod run;
/// `version`.
pub mod version;
/// `web search` and `web get`.
pub mod web;
