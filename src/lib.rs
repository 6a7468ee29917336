//! # mdweave
//!
//! Gathers files, web pages and script output into a single Markdown stream.
//!
//! The crate is split the same way the binary runs:
//!
//! - **`core`**: the engine. Input expansion (`@file`, `@@file`, aliases), the command
//!   grammar, file discovery, content filtering and the line-window formatter.
//! - **`cli`**: the command-line surface. Help rendering, the command dispatcher and one
//!   handler per command kind.
//! - **`system`**: boundaries to external collaborators (process execution, the
//!   instruction engine and web access).

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod state;
pub mod system;
