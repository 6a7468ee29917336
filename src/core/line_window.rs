// src/core/line_window.rs

//! # Line-Window Formatter
//!
//! Selects the lines of a file that match the line patterns, widens each match by the
//! configured context and renders the result.
//!
//! - A line *matches* when every include pattern matches it and no remove pattern does.
//! - The included set is the union of `[i - before, i + after]` around every match,
//!   clipped to the file, ascending and without duplicates.
//! - A gap between included indices starts a new excerpt. When context is in use
//!   (`before` or `after` is non-zero) the excerpts are split by closing and reopening
//!   the fence.
//! - An included line that a remove pattern matches (a *removal candidate*, which can only
//!   appear as context) loses its content: it renders as `N:` with line numbers and not at
//!   all without them.
//!
//! Line numbers are 1-based in the rendered output.

use crate::core::content_filter::text_matches;
use regex::Regex;
use std::collections::BTreeSet;

/// The delimiters of a fenced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    /// Opening line, including any language tag.
    pub open: String,
    /// Closing line.
    pub close: String,
}

impl Fence {
    /// The entry that separates two excerpts inside one fenced block.
    fn separator(&self) -> String {
        format!("{}\n\n{}", self.close, self.open)
    }
}

/// Zero-based indices of the lines selected by the patterns.
pub fn matched_indices<S: AsRef<str>>(lines: &[S], include: &[Regex], remove: &[Regex]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| text_matches(line.as_ref(), include, remove))
        .map(|(i, _)| i)
        .collect()
}

/// Expands `matched` by `before`/`after` lines of context, clipped to `[0, line_count)`.
pub fn window_indices(matched: &[usize], before: usize, after: usize, line_count: usize) -> BTreeSet<usize> {
    let mut included = BTreeSet::new();
    let Some(last) = line_count.checked_sub(1) else {
        return included;
    };
    for &index in matched {
        let start = index.saturating_sub(before);
        let end = index.saturating_add(after).min(last);
        included.extend(start..=end);
    }
    included
}

/// Renders the selected lines of a file.
///
/// Returns an empty string when no line matches.
pub fn format<S: AsRef<str>>(
    lines: &[S],
    include: &[Regex],
    remove: &[Regex],
    before: usize,
    after: usize,
    line_numbers: bool,
    fence: &Fence,
) -> String {
    let matched = matched_indices(lines, include, remove);
    if matched.is_empty() {
        return String::new();
    }
    let included = window_indices(&matched, before, after, lines.len());
    let with_context = before > 0 || after > 0;

    let mut entries: Vec<String> = Vec::with_capacity(included.len());
    let mut previous: Option<usize> = None;

    for index in included {
        if with_context && previous.is_some_and(|p| index != p + 1) {
            entries.push(fence.separator());
        }
        previous = Some(index);

        let Some(line) = lines.get(index).map(AsRef::as_ref) else {
            continue;
        };
        let removed = remove.iter().any(|re| re.is_match(line));
        match (line_numbers, removed) {
            (true, true) => entries.push(format!("{}:", index + 1)),
            (true, false) => entries.push(format!("{}: {}", index + 1, line)),
            (false, true) => {}
            (false, false) => entries.push(line.to_string()),
        }
    }

    entries.join("\n")
}
