// src/core/patterns.rs

//! Compiles the regular expressions and wildcard patterns that arrive on the command line
//! (or from the ignore file) into matchers, with errors that name the offending pattern.

use globset::GlobBuilder;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// A pattern that could not be compiled.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The regular expression is malformed.
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        /// The pattern as typed.
        pattern: String,
        /// The underlying error from the `regex` crate.
        #[source]
        source: regex::Error,
    },
    /// The glob is malformed.
    #[error("invalid glob '{pattern}': {source}")]
    InvalidGlob {
        /// The pattern as typed.
        pattern: String,
        /// The underlying error from the `globset` crate.
        #[source]
        source: globset::Error,
    },
}

/// Exclude patterns split by kind.
#[derive(Debug, Clone, Default)]
pub struct ExcludePatterns {
    /// Patterns that contain a path separator, used as globs.
    pub globs: Vec<String>,
    /// Patterns without a path separator, matched against the file name only.
    pub file_names: Vec<Regex>,
}

/// Compiles a case-insensitive regular expression.
pub fn compile_regex(pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compiles every pattern, stopping at the first failure.
pub fn compile_regexes<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, PatternError> {
    patterns.iter().map(|p| compile_regex(p.as_ref())).collect()
}

/// Checks that `pattern` is a well-formed glob.
pub fn validate_glob(pattern: &str) -> Result<(), PatternError> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|_| ())
        .map_err(|source| PatternError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })
}

/// Whether a pattern names a path (and is therefore a glob) rather than a file name.
pub fn is_path_pattern(pattern: &str) -> bool {
    pattern.contains('/') || pattern.contains('\\')
}

/// Converts a file-name wildcard into an anchored regular expression.
///
/// `*` matches any run of characters and `?` exactly one; everything else is literal.
/// `*.log` becomes `^.*\.log$`.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    regex.push('$');
    regex
}

/// Splits exclude patterns into globs (with a path separator) and file-name wildcards
/// (without one), validating each.
pub fn split_exclude_patterns<S: AsRef<str>>(
    patterns: &[S],
) -> Result<ExcludePatterns, PatternError> {
    let mut split = ExcludePatterns::default();
    for pattern in patterns.iter().map(AsRef::as_ref) {
        if is_path_pattern(pattern) {
            validate_glob(pattern)?;
            split.globs.push(pattern.to_string());
        } else {
            let regex = compile_regex(&wildcard_to_regex(pattern)).map_err(|e| match e {
                // Report the wildcard the user typed, not the generated regex.
                PatternError::InvalidRegex { source, .. } => PatternError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                },
                other => other,
            })?;
            split.file_names.push(regex);
        }
    }
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_regex_is_case_insensitive() {
        let re = compile_regex("todo").unwrap();
        assert!(re.is_match("// TODO: later"));
    }

    #[test]
    fn test_compile_regex_reports_pattern() {
        let err = compile_regex("(unclosed").unwrap_err();
        assert!(err.to_string().contains("'(unclosed'"));
    }

    #[test]
    fn test_validate_glob_rejects_malformed() {
        assert!(validate_glob("**/*.rs").is_ok());
        assert!(validate_glob("src/[a-").is_err());
    }

    #[test]
    fn test_wildcard_to_regex_escapes_and_anchors() {
        assert_eq!(wildcard_to_regex("*.log"), r"^.*\.log$");
        let re = compile_regex(&wildcard_to_regex("file?.TXT")).unwrap();
        assert!(re.is_match("file1.txt"));
        assert!(!re.is_match("file12.txt"));
        assert!(!re.is_match("myfile1.txt"));
    }

    #[test]
    fn test_split_exclude_patterns_by_separator() {
        let split = split_exclude_patterns(&["target/**", "*.lock", r"bin\*"]).unwrap();
        assert_eq!(split.globs, vec!["target/**", r"bin\*"]);
        assert_eq!(split.file_names.len(), 1);
        assert!(split.file_names[0].is_match("Cargo.lock"));
        assert!(!split.file_names[0].is_match("Cargo.toml"));
    }
}
