// src/core/aliases.rs

//! Named, persisted token lists.
//!
//! An alias `NAME` is the file `NAME.alias` with one token per line. It is looked up in the
//! context's alias directories in order (project-local first, then the user configuration
//! directory) and referenced on the command line as `--NAME`.

use crate::{constants::ALIAS_FILE_EXTENSION, state::AppContext};
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the path of the first alias file named `name`, if any.
pub fn find_alias(ctx: &AppContext, name: &str) -> Option<PathBuf> {
    if validate_alias_name(name).is_err() {
        return None;
    }
    let file_name = format!("{}.{}", name, ALIAS_FILE_EXTENSION);
    ctx.alias_dirs
        .iter()
        .map(|dir| dir.join(&file_name))
        .find(|path| path.is_file())
}

/// Loads the raw lines of alias `name`, or `None` when no such alias exists.
pub fn load_alias(ctx: &AppContext, name: &str) -> std::io::Result<Option<Vec<String>>> {
    let Some(path) = find_alias(ctx, name) else {
        return Ok(None);
    };
    log::debug!("Loading alias '{}' from '{}'", name, path.display());
    let text = fs::read_to_string(&path)?;
    Ok(Some(
        text.lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

/// Writes `tokens` as alias `name` into `dir`, creating the directory if needed.
pub fn save_alias(dir: &Path, name: &str, tokens: &[String]) -> Result<PathBuf> {
    let clean_name = validate_alias_name(name)?;
    fs::create_dir_all(dir)
        .with_context(|| format!(t!("alias.error.create_dir"), path = dir.display()))?;
    let path = dir.join(format!("{}.{}", clean_name, ALIAS_FILE_EXTENSION));
    let mut body = tokens.join("\n");
    body.push('\n');
    fs::write(&path, body)
        .with_context(|| format!(t!("alias.error.write_failed"), path = path.display()))?;
    Ok(path)
}

/// The tokens an alias saved with `--save-alias NAME` stores: the raw arguments with the
/// `--save-alias NAME` pair removed.
pub fn alias_body(raw_args: &[String], name: &str) -> Vec<String> {
    let mut body = Vec::with_capacity(raw_args.len());
    let mut iter = raw_args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == "--save-alias" && iter.peek().is_some_and(|next| *next == name) {
            iter.next();
            continue;
        }
        body.push(arg.clone());
    }
    body
}

/// Validates an alias name: it becomes both a file name and a `--NAME` option.
pub fn validate_alias_name(raw_name: &str) -> Result<String> {
    let name = raw_name.trim();

    if name.is_empty() {
        return Err(anyhow!(t!("alias.error.empty_name")));
    }
    if name.starts_with('-')
        || name.contains(char::is_whitespace)
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(anyhow!(t!("alias.error.invalid_name"), name = name));
    }

    let reserved_names = [".", ".."];
    if reserved_names.contains(&name) {
        return Err(anyhow!(t!("alias.error.reserved_name"), name = name));
    }

    Ok(name.to_string())
}
