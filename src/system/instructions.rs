// src/system/instructions.rs

//! The boundary to the instruction engine.
//!
//! The engine is an external program named by the `MDWEAVE_INSTRUCTIONS_CMD` environment
//! variable. It is invoked once per instruction as
//! `CMD --instructions TEXT [--built-in-functions]` with the content on standard input,
//! and its standard output becomes the content for the next instruction.

use crate::{constants::INSTRUCTIONS_CMD_ENV, system::executor};
use std::path::PathBuf;

/// Applies instruction texts to content.
///
/// Implementations never fail: on error they return the content annotated with the error.
pub trait InstructionProcessor: Send + Sync {
    /// Applies `instructions`, in order, to `content`.
    fn apply(&self, instructions: &[String], content: &str, use_built_ins: bool) -> String;
}

/// Runs the external instruction engine.
#[derive(Debug, Clone)]
pub struct ExternalInstructionProcessor {
    command: Option<String>,
    cwd: PathBuf,
}

impl ExternalInstructionProcessor {
    /// Creates a processor for an explicit command line (or none).
    pub fn new(command: Option<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
            cwd: cwd.into(),
        }
    }

    /// Creates a processor configured from the environment.
    pub fn from_env(cwd: impl Into<PathBuf>) -> Self {
        Self::new(std::env::var(INSTRUCTIONS_CMD_ENV).ok(), cwd)
    }
}

impl InstructionProcessor for ExternalInstructionProcessor {
    fn apply(&self, instructions: &[String], content: &str, use_built_ins: bool) -> String {
        if instructions.is_empty() {
            return content.to_string();
        }
        let Some(command) = &self.command else {
            log::warn!("Instructions given but {} is not set", INSTRUCTIONS_CMD_ENV);
            return annotate(
                content,
                &format!(t!("instructions.error.not_configured"), var = INSTRUCTIONS_CMD_ENV),
            );
        };

        let mut current = content.to_string();
        for instruction in instructions {
            let mut args = vec!["--instructions".to_string(), instruction.clone()];
            if use_built_ins {
                args.push("--built-in-functions".to_string());
            }
            log::info!("Applying instruction ({} chars) with '{}'", instruction.len(), command);
            match executor::run_with_input(command, &args, &current, &self.cwd) {
                Ok(output) => current = output,
                Err(e) => {
                    log::warn!("Instruction engine failed: {}", e);
                    return annotate(
                        &current,
                        &format!(t!("instructions.error.failed"), error = e),
                    );
                }
            }
        }
        current
    }
}

fn annotate(content: &str, message: &str) -> String {
    format!("{}\n\n> **Error:** {}\n", content.trim_end(), message)
}
