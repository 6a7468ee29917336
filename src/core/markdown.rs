// src/core/markdown.rs

//! Markdown rendering helpers for file sections and diagnostics.

use crate::core::line_window::Fence;
use std::path::Path;

/// Maps a file extension to a fence language tag.
pub fn language_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "rs" => "rust",
        "cs" => "csharp",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "sh" | "bash" => "bash",
        "ps1" => "powershell",
        "bat" | "cmd" => "batch",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" | "csproj" => "xml",
        "html" | "htm" => "html",
        "css" => "css",
        "sql" => "sql",
        "md" => "markdown",
        _ => "",
    }
}

/// Builds a fence for `content` that is longer than any backtick run inside it.
pub fn fence_for(content: &str, language: &str) -> Fence {
    let longest_run = content
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let ticks = "`".repeat(longest_run.saturating_add(1).max(3));
    Fence {
        open: format!("{}{}", ticks, language),
        close: ticks,
    }
}

/// A `## path` section with `body` inside `fence`.
pub fn file_section(display_path: &str, body: &str, fence: &Fence) -> String {
    format!(
        "## {}\n\n{}\n{}\n{}\n",
        display_path, fence.open, body, fence.close
    )
}

/// A section reporting an error in place of a subject's content.
pub fn error_section(display_path: &str, message: &str) -> String {
    format!("## {}\n\n> **Error:** {}\n", display_path, message)
}

/// A diagnostic section for a find-files command that produced no files.
pub fn no_match_section(globs: &[String], message: &str) -> String {
    format!("## {}\n\n> {}\n", globs.join(" "), message)
}

/// Joins rendered sections with a blank line between each.
pub fn join_sections(sections: &[String]) -> String {
    sections
        .iter()
        .map(|s| s.trim_end())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
