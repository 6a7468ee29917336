// src/core/content_filter.rs

//! File-level content predicates.

use regex::Regex;
use std::fs;
use std::path::Path;

/// Whether `text` satisfies the predicates: every include pattern matches somewhere and no
/// exclude pattern matches anywhere.
pub fn text_matches(text: &str, include: &[Regex], exclude: &[Regex]) -> bool {
    include.iter().all(|re| re.is_match(text)) && !exclude.iter().any(|re| re.is_match(text))
}

/// Applies [`text_matches`] to the content of `path`.
///
/// With both lists empty the file is accepted without being read. A file that cannot be
/// read is treated as non-matching.
pub fn matches(path: &Path, include: &[Regex], exclude: &[Regex]) -> bool {
    if include.is_empty() && exclude.is_empty() {
        return true;
    }
    match fs::read_to_string(path) {
        Ok(text) => text_matches(&text, include, exclude),
        Err(e) => {
            log::debug!("Skipping unreadable file '{}': {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::patterns::compile_regexes;
    use tempfile::TempDir;

    #[test]
    fn test_all_includes_and_no_excludes() {
        let include = compile_regexes(&["fn", "main"]).unwrap();
        let exclude = compile_regexes(&["unsafe"]).unwrap();

        assert!(text_matches("fn main() {}", &include, &exclude));
        assert!(!text_matches("fn helper() {}", &include, &exclude));
        assert!(!text_matches("fn main() { unsafe {} }", &include, &exclude));
    }

    #[test]
    fn test_empty_predicates_skip_io() {
        // The path does not exist; it must not be read.
        assert!(matches(Path::new("/definitely/not/here.txt"), &[], &[]));
    }

    #[test]
    fn test_unreadable_file_does_not_match() {
        let include = compile_regexes(&["x"]).unwrap();
        assert!(!matches(Path::new("/definitely/not/here.txt"), &include, &[]));
    }

    #[test]
    fn test_reads_file_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "Hello\nWorld\n").unwrap();

        let include = compile_regexes(&["world"]).unwrap();
        assert!(matches(&path, &include, &[]));
        let exclude = compile_regexes(&["HELLO"]).unwrap();
        assert!(!matches(&path, &[], &exclude));
    }
}
