// src/system/web.rs

//! The boundary to web search and page retrieval.

use crate::models::SearchEngine;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Web access is not available in this build (requested: {0})")]
    Unavailable(String),
    #[error("Search on '{engine}' failed: {message}")]
    SearchFailed { engine: SearchEngine, message: String },
    #[error("Could not fetch '{url}': {message}")]
    FetchFailed { url: String, message: String },
}

/// Searches the web and fetches pages.
pub trait WebProvider: Send + Sync {
    /// Returns up to `max_results` result URLs for `terms`.
    fn search(&self, engine: SearchEngine, terms: &[String], max_results: usize) -> Result<Vec<String>, WebError>;

    /// Returns the content of `url`, reduced to text when `strip_html` is set.
    fn fetch(&self, url: &str, strip_html: bool, interactive: bool) -> Result<String, WebError>;
}

/// The provider used when no browser automation is wired in. Every call fails, and the
/// handlers render the failure inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableWebProvider;

impl WebProvider for UnavailableWebProvider {
    fn search(&self, engine: SearchEngine, terms: &[String], _max_results: usize) -> Result<Vec<String>, WebError> {
        Err(WebError::Unavailable(format!("{} search for '{}'", engine, terms.join(" "))))
    }

    fn fetch(&self, url: &str, _strip_html: bool, _interactive: bool) -> Result<String, WebError> {
        Err(WebError::Unavailable(format!("fetch of '{}'", url)))
    }
}

/// A file-system friendly name for a URL, used for saved pages.
pub fn page_file_name(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let mut name: String = without_scheme
        .trim_end_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("page");
    }
    name.push_str(".md");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_provider_errors() {
        let provider = UnavailableWebProvider;
        let err = provider
            .search(SearchEngine::Bing, &["rust".to_string()], 3)
            .unwrap_err();
        assert!(err.to_string().contains("bing search for 'rust'"));
        assert!(provider.fetch("https://example.com", false, false).is_err());
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("https://example.com/a/b?q=1"), "example.com_a_b_q_1.md");
        assert_eq!(page_file_name("https://"), "page.md");
    }
}
