// src/core/expander.rs

//! # Input Token Expander
//!
//! Flattens the raw argument vector into the token stream the grammar consumes:
//!
//! - `@@PATH` is replaced by the lines of `PATH`, each line expanded again.
//! - `@PATH` is replaced by the whole text of `PATH` as a single token.
//! - `-` as a path refers to standard input, read once per run (see [`StdinCache`]).
//! - A reference to a missing file is kept as a literal token.
//!
//! Expansion recursion is unbounded by default: a file that references itself recurses
//! until the stack runs out. [`DepthLimit::Max`] is the seam for a bounded variant.
//!
//! [`StdinCache`]: crate::state::StdinCache

use crate::{
    constants::{AND_SEPARATOR, DEFAULT_OPTIONS_FILENAME},
    state::AppContext,
};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// The path that stands for standard input.
const STDIN_PATH: &str = "-";

/// Errors raised while expanding input tokens.
#[derive(Error, Debug)]
pub enum ExpandError {
    /// A referenced file exists but could not be read.
    #[error("Could not read '{path}': {source}")]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configured depth limit was exceeded.
    #[error("Input expansion exceeded the maximum depth of {limit} while expanding '{token}'")]
    TooDeep {
        /// The configured limit.
        limit: usize,
        /// The token being expanded when the limit was hit.
        token: String,
    },
}

/// How deep `@@` references may nest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepthLimit {
    /// No limit; self-referencing files recurse until the stack is exhausted.
    #[default]
    Unbounded,
    /// Fail with [`ExpandError::TooDeep`] past this many nested references.
    Max(usize),
}

/// Expands raw argument tokens against the files and stdin visible to an [`AppContext`].
#[derive(Debug)]
pub struct Expander<'a> {
    ctx: &'a AppContext,
    limit: DepthLimit,
}

impl<'a> Expander<'a> {
    /// Creates an unbounded expander.
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            limit: DepthLimit::Unbounded,
        }
    }

    /// Replaces the depth limit.
    pub fn with_limit(mut self, limit: DepthLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Expands every token, left to right, into a flat token stream.
    pub fn expand<S: AsRef<str>>(&self, raw: &[S]) -> Result<Vec<String>, ExpandError> {
        let mut out = Vec::with_capacity(raw.len());
        for token in raw {
            self.expand_into(token.as_ref(), 0, &mut out)?;
        }
        log::debug!("Expanded {} raw token(s) into {}", raw.len(), out.len());
        Ok(out)
    }

    /// Expands a list of lines (e.g. the body of an alias) as if each were an `@@` line.
    pub fn expand_lines(&self, lines: &[String]) -> Result<Vec<String>, ExpandError> {
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            self.expand_into(line, 1, &mut out)?;
        }
        Ok(out)
    }

    fn expand_into(&self, token: &str, depth: usize, out: &mut Vec<String>) -> Result<(), ExpandError> {
        if let DepthLimit::Max(limit) = self.limit
            && depth > limit
        {
            return Err(ExpandError::TooDeep {
                limit,
                token: token.to_string(),
            });
        }

        if let Some(path) = token.strip_prefix("@@") {
            if let Some(lines) = self.read_lines(path)? {
                log::trace!("Expanding '{}' into {} line(s)", token, lines.len());
                for line in lines {
                    self.expand_into(&line, depth + 1, out)?;
                }
                return Ok(());
            }
        } else if let Some(path) = token.strip_prefix('@')
            && let Some(text) = self.read_text(path)?
        {
            out.push(text);
            return Ok(());
        }

        out.push(token.to_string());
        Ok(())
    }

    /// Reads `path` as lines, or `None` when it does not exist.
    fn read_lines(&self, path: &str) -> Result<Option<Vec<String>>, ExpandError> {
        if path == STDIN_PATH {
            return Ok(Some(non_empty_lines(self.ctx.stdin.lines().iter().map(String::as_str))));
        }
        Ok(self
            .read_text(path)?
            .map(|text| non_empty_lines(text.lines())))
    }

    /// Reads `path` as text, or `None` when it does not exist.
    fn read_text(&self, path: &str) -> Result<Option<String>, ExpandError> {
        if path == STDIN_PATH {
            return Ok(Some(self.ctx.stdin.text()));
        }
        if path.is_empty() {
            return Ok(None);
        }
        let full_path = self.ctx.resolve(path);
        if !full_path.is_file() {
            return Ok(None);
        }
        fs::read_to_string(&full_path)
            .map(Some)
            .map_err(|source| ExpandError::Read {
                path: full_path,
                source,
            })
    }
}

/// Blank lines carry no token.
fn non_empty_lines<'s>(lines: impl Iterator<Item = &'s str>) -> Vec<String> {
    lines
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Prepends the default options file (as `@@FILE --and`) when arguments were given and the
/// file exists in the working directory.
pub fn with_default_options(raw: Vec<String>, ctx: &AppContext) -> Vec<String> {
    if raw.is_empty() || !ctx.resolve(DEFAULT_OPTIONS_FILENAME).is_file() {
        return raw;
    }
    log::debug!("Prepending default options from '{}'", DEFAULT_OPTIONS_FILENAME);
    let mut tokens = Vec::with_capacity(raw.len() + 2);
    tokens.push(format!("@@{}", DEFAULT_OPTIONS_FILENAME));
    tokens.push(AND_SEPARATOR.to_string());
    tokens.extend(raw);
    tokens
}
