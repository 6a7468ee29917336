// src/cli/handlers/commons.rs

// Shared plumbing for the command handlers.

use anyhow::{Context, Result};
use rayon::ThreadPool;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    core::templates,
    state::AppContext,
    system::{instructions::InstructionProcessor, web::WebProvider},
};

/// Everything a handler needs to run one command.
pub struct RunEnv<'a> {
    /// The run context.
    pub ctx: &'a AppContext,
    /// The instruction engine.
    pub instructions: &'a dyn InstructionProcessor,
    /// Web search and page retrieval.
    pub web: &'a dyn WebProvider,
    /// The pool bounding concurrent per-file and per-page work.
    pub pool: &'a ThreadPool,
}

impl fmt::Debug for RunEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunEnv")
            .field("ctx", self.ctx)
            .field("threads", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

/// Expands `template` for `subject` and writes `content` there, creating parent
/// directories as needed.
pub fn save_text(template: &str, subject: &Path, content: &str, base_dir: &Path) -> Result<PathBuf> {
    let path = templates::expand_template(template, subject, base_dir)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create directory '{}'", parent.display()))?;
    }
    fs::write(&path, content).with_context(|| format!("Could not write '{}'", path.display()))?;
    log::info!("Saved output to '{}'", path.display());
    Ok(path)
}

/// Appends an inline error note to a rendered section.
pub fn append_error(section: &mut String, message: &str) {
    let trimmed = section.trim_end().len();
    section.truncate(trimmed);
    section.push_str(&format!("\n\n> **Error:** {}\n", message));
}
