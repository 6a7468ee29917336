// src/core/templates.rs

//! Save-template expansion.
//!
//! Templates may contain `{filePath}`, `{fileBase}`, `{fileExt}` and `{timeStamp}` (any
//! letter case), resolved against a subject file name, plus `~` and `$VAR` references
//! resolved through `shellexpand`.

use anyhow::{Result, anyhow};
use chrono::Local;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"(?i)\{(filepath|filebase|fileext|timestamp)\}")
            .expect("Failed to compile placeholder regex");
}

/// Substitutes the placeholders in `template` for `subject`.
pub fn substitute(template: &str, subject: &Path) -> String {
    let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            let key = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
            match key.as_str() {
                "filepath" => subject
                    .parent()
                    .map(|p| p.to_string_lossy().into_owned())
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| ".".to_string()),
                "filebase" => subject
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                "fileext" => subject
                    .extension()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                "timestamp" => timestamp.clone(),
                _ => caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default(),
            }
        })
        .into_owned()
}

/// Expands `template` for `subject` into a path, resolved against `base_dir` when relative.
pub fn expand_template(template: &str, subject: &Path, base_dir: &Path) -> Result<PathBuf> {
    let substituted = substitute(template, subject);
    let expanded = shellexpand::full(&substituted)
        .map_err(|e| anyhow!(t!("templates.error.expand_failed"), template = template, error = e))?;
    let path = PathBuf::from(expanded.into_owned());
    Ok(if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    })
}
