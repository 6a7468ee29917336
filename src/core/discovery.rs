// src/core/discovery.rs

//! # File Discovery
//!
//! Resolves include and exclude globs to an ordered, de-duplicated file list, then applies
//! the file-name and content filters.
//!
//! Globs are matched case-insensitively against `/`-separated paths relative to the
//! working directory (absolute globs match absolute paths). `*` and `?` never cross a
//! separator; `**` does. Each glob walks only the directory named by its literal prefix,
//! whose segments are looked up case-insensitively too.

use crate::{
    constants::IGNORE_FILENAME,
    core::{content_filter, patterns},
    models::FindFilesCommand,
};
use globset::{GlobBuilder, GlobMatcher};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Characters that make a path segment a pattern rather than a literal.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// The inputs of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    /// Globs whose matches are included.
    pub include_globs: Vec<String>,
    /// Globs whose matches are removed from the result.
    pub exclude_globs: Vec<String>,
    /// File names matching any of these are removed.
    pub exclude_file_names: Vec<Regex>,
    /// Every pattern must match the content.
    pub include_contains: Vec<Regex>,
    /// No pattern may match the content.
    pub exclude_contains: Vec<Regex>,
}

impl FileQuery {
    /// The query described by a find-files command.
    pub fn from_command(cmd: &FindFilesCommand) -> Self {
        Self {
            include_globs: cmd.globs.clone(),
            exclude_globs: cmd.exclude_globs.clone(),
            exclude_file_names: cmd.exclude_file_name_patterns.clone(),
            include_contains: cmd.include_file_contains.clone(),
            exclude_contains: cmd.exclude_file_contains.clone(),
        }
    }

    /// Adds the entries of an ignore file to the exclusions.
    pub fn with_ignored(mut self, ignored: patterns::ExcludePatterns) -> Self {
        self.exclude_globs.extend(ignored.globs);
        self.exclude_file_names.extend(ignored.file_names);
        self
    }
}

/// The outcome of a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The files that passed every filter, in glob-resolution order.
    Found(Vec<PathBuf>),
    /// The globs (after exclusions) matched no file.
    NoFilesFound,
    /// Files were found, but the content filter rejected all of them.
    NoFilesMatched,
}

/// Runs discovery relative to `root`.
///
/// Content filtering runs on the current rayon pool; the result keeps the resolution order.
pub fn find_files(root: &Path, query: &FileQuery) -> Discovery {
    let excluded: HashSet<PathBuf> = resolve_globs(root, &query.exclude_globs).into_iter().collect();

    let candidates: Vec<PathBuf> = resolve_globs(root, &query.include_globs)
        .into_iter()
        .filter(|path| !excluded.contains(path))
        .filter(|path| !file_name_excluded(path, &query.exclude_file_names))
        .collect();

    if candidates.is_empty() {
        log::debug!("No files found for globs {:?}", query.include_globs);
        return Discovery::NoFilesFound;
    }
    log::debug!("{} candidate file(s) before content filtering", candidates.len());

    let matched: Vec<PathBuf> = candidates
        .into_par_iter()
        .filter(|path| content_filter::matches(path, &query.include_contains, &query.exclude_contains))
        .collect();

    if matched.is_empty() {
        Discovery::NoFilesMatched
    } else {
        Discovery::Found(matched)
    }
}

fn file_name_excluded(path: &Path, patterns: &[Regex]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    patterns.iter().any(|re| re.is_match(name))
}

/// Resolves `globs` to the files they match, in glob order then walk order, each file once.
pub fn resolve_globs(root: &Path, globs: &[String]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for raw in globs {
        let glob = raw.strip_prefix("./").unwrap_or(raw);
        let matcher = match build_matcher(glob) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Skipping glob: {}", e);
                continue;
            }
        };
        let absolute = Path::new(glob).is_absolute();
        let bases = resolve_base(root, &literal_base(glob));
        if bases.is_empty() {
            log::trace!("Glob '{}' has no existing base directory", glob);
            continue;
        }

        for entry in bases.iter().flat_map(|base| {
            WalkDir::new(base)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
        }) {
            let candidate = if absolute {
                entry.path().to_string_lossy().replace('\\', "/")
            } else {
                match entry.path().strip_prefix(root) {
                    Ok(relative) => slash_path(relative),
                    Err(_) => continue,
                }
            };
            if matcher.is_match(&candidate) && seen.insert(entry.path().to_path_buf()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files
}

fn build_matcher(glob: &str) -> Result<GlobMatcher, patterns::PatternError> {
    GlobBuilder::new(glob)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|source| patterns::PatternError::InvalidGlob {
            pattern: glob.to_string(),
            source,
        })
}

/// The directory a glob's walk starts from: its leading literal segments, or the parent
/// directory when the whole glob is literal.
fn literal_base(glob: &str) -> PathBuf {
    let segments: Vec<&str> = glob.split('/').collect();
    let literal_count = segments
        .iter()
        .take_while(|segment| !segment.contains(GLOB_META))
        .count();
    let take = if literal_count == segments.len() {
        literal_count.saturating_sub(1)
    } else {
        literal_count
    };
    let base = segments.get(..take).unwrap_or_default().join("/");
    if base.is_empty() && glob.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::from(base)
    }
}

/// The existing directories `literal` names below `root`. Each segment is matched
/// case-insensitively; an exact match wins over differently-cased siblings.
fn resolve_base(root: &Path, literal: &Path) -> Vec<PathBuf> {
    let mut bases = vec![root.to_path_buf()];
    for component in literal.components() {
        bases = match component {
            Component::Normal(segment) => bases
                .iter()
                .flat_map(|dir| matching_children(dir, segment))
                .collect(),
            other => bases.iter().map(|dir| dir.join(other)).collect(),
        };
        if bases.is_empty() {
            break;
        }
    }
    bases.retain(|base| base.exists());
    bases
}

fn matching_children(dir: &Path, segment: &OsStr) -> Vec<PathBuf> {
    let exact = dir.join(segment);
    if exact.exists() {
        return vec![exact];
    }
    let wanted = segment.to_string_lossy().to_lowercase();
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().to_lowercase() == wanted)
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// Joins the normal components of a relative path with `/`.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The display form of a discovered path: relative to `root` when below it.
pub fn display_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => slash_path(relative),
        Err(_) => path.display().to_string(),
    }
}

/// Loads the exclusions of the nearest ignore file in `start` or one of its ancestors.
///
/// Blank lines and `#` comments are skipped; an invalid entry is reported and skipped.
pub fn load_ignore_file(start: &Path) -> patterns::ExcludePatterns {
    let mut ignored = patterns::ExcludePatterns::default();
    let Some(path) = start
        .ancestors()
        .map(|dir| dir.join(IGNORE_FILENAME))
        .find(|p| p.is_file())
    else {
        return ignored;
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Could not read ignore file '{}': {}", path.display(), e);
            return ignored;
        }
    };
    log::debug!("Loading exclusions from '{}'", path.display());

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match patterns::split_exclude_patterns(&[line]) {
            Ok(split) => {
                ignored.globs.extend(split.globs);
                ignored.file_names.extend(split.file_names);
            }
            Err(e) => log::warn!("Ignoring entry in '{}': {}", path.display(), e),
        }
    }
    ignored
}
