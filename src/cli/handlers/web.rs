// src/cli/handlers/web.rs

use crate::{
    cli::handlers::commons::{self, RunEnv},
    core::markdown,
    models::{PageOptions, WebGetCommand, WebSearchCommand, instructions_for},
    system::web::page_file_name,
};
use anyhow::Result;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Runs `web search`: lists the result URLs, or fetches every result with `--get`.
pub fn handle_search(cmd: &WebSearchCommand, env: &RunEnv<'_>) -> Result<String> {
    let query = cmd.terms.join(" ");
    log::info!("Searching {} for '{}'", cmd.engine, query);

    let urls = match env.web.search(cmd.engine, &cmd.terms, cmd.max_results) {
        Ok(urls) => urls,
        Err(e) => {
            log::warn!("{}", e);
            return Ok(markdown::error_section(&query, &e.to_string()));
        }
    };

    if cmd.get_pages {
        return Ok(fetch_pages(&urls, &cmd.page, cmd.shared.use_built_in_functions, env));
    }

    let mut out = format!("## {}\n\n", format!(t!("web.label.results"), query = query));
    for url in &urls {
        out.push_str(&format!("- {}\n", url));
    }
    Ok(out)
}

/// Runs `web get`: fetches every URL.
pub fn handle_get(cmd: &WebGetCommand, env: &RunEnv<'_>) -> Result<String> {
    Ok(fetch_pages(&cmd.urls, &cmd.page, cmd.shared.use_built_in_functions, env))
}

fn fetch_pages(urls: &[String], page: &PageOptions, use_built_ins: bool, env: &RunEnv<'_>) -> String {
    let sections: Vec<String> = env.pool.install(|| {
        urls.par_iter()
            .map(|url| render_page(url, page, use_built_ins, env))
            .collect()
    });
    markdown::join_sections(&sections)
}

fn render_page(url: &str, page: &PageOptions, use_built_ins: bool, env: &RunEnv<'_>) -> String {
    let content = match env.web.fetch(url, page.strip_html, page.interactive) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("{}", e);
            return markdown::error_section(url, &e.to_string());
        }
    };
    let base_dir = env.ctx.working_dir.as_path();
    let file_name = page_file_name(url);

    let language = if page.strip_html { "" } else { "html" };
    let fence = markdown::fence_for(&content, language);
    let mut section = markdown::file_section(url, content.trim_end(), &fence);

    if let Some(folder) = &page.save_page_folder {
        let target = env.ctx.resolve(folder).join(&file_name);
        let saved = fs::create_dir_all(env.ctx.resolve(folder)).and_then(|_| fs::write(&target, &content));
        if let Err(e) = saved {
            log::warn!("Could not save page '{}': {}", target.display(), e);
            commons::append_error(&mut section, &e.to_string());
        }
    }

    let instructions = instructions_for(&page.page_instructions, url);
    if !instructions.is_empty() {
        section = env.instructions.apply(&instructions, &section, use_built_ins);
    }

    if let Some(template) = &page.save_page_output
        && let Err(e) = commons::save_text(template, Path::new(&file_name), &section, base_dir)
    {
        log::warn!("Could not save output for '{}': {:#}", url, e);
        commons::append_error(&mut section, &format!("{:#}", e));
    }

    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InstructionBinding, SearchEngine};
    use crate::state::{AppContext, StdinCache};
    use crate::system::{
        instructions::ExternalInstructionProcessor,
        web::{UnavailableWebProvider, WebError, WebProvider},
    };
    use rayon::ThreadPoolBuilder;
    use tempfile::TempDir;

    struct FakeWeb;

    impl WebProvider for FakeWeb {
        fn search(&self, _engine: SearchEngine, terms: &[String], max_results: usize) -> Result<Vec<String>, WebError> {
            Ok((1..=max_results)
                .map(|i| format!("https://example.com/{}/{}", terms.join("-"), i))
                .collect())
        }

        fn fetch(&self, url: &str, strip_html: bool, _interactive: bool) -> Result<String, WebError> {
            if strip_html {
                Ok(format!("text of {}", url))
            } else {
                Ok(format!("<p>{}</p>", url))
            }
        }
    }

    fn with_env<T>(dir: &TempDir, web: &dyn WebProvider, f: impl FnOnce(&RunEnv<'_>) -> T) -> T {
        let ctx = AppContext::rooted(dir.path(), StdinCache::preloaded(vec![]));
        let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let instructions = ExternalInstructionProcessor::new(None, dir.path());
        let env = RunEnv {
            ctx: &ctx,
            instructions: &instructions,
            web,
            pool: &pool,
        };
        f(&env)
    }

    #[test]
    fn test_search_lists_results() {
        let dir = TempDir::new().unwrap();
        let cmd = WebSearchCommand {
            terms: vec!["rust".to_string()],
            max_results: 2,
            ..Default::default()
        };
        let out = with_env(&dir, &FakeWeb, |env| handle_search(&cmd, env)).unwrap();
        assert!(out.contains("- https://example.com/rust/1\n- https://example.com/rust/2\n"));
    }

    #[test]
    fn test_search_with_get_fetches_in_order() {
        let dir = TempDir::new().unwrap();
        let mut cmd = WebSearchCommand {
            terms: vec!["rust".to_string()],
            max_results: 3,
            get_pages: true,
            ..Default::default()
        };
        cmd.page.strip_html = true;
        let out = with_env(&dir, &FakeWeb, |env| handle_search(&cmd, env)).unwrap();
        let first = out.find("text of https://example.com/rust/1").unwrap();
        let third = out.find("text of https://example.com/rust/3").unwrap();
        assert!(first < third);
    }

    #[test]
    fn test_get_saves_pages_to_folder() {
        let dir = TempDir::new().unwrap();
        let mut cmd = WebGetCommand {
            urls: vec!["https://example.com/a".to_string()],
            ..Default::default()
        };
        cmd.page.save_page_folder = Some("pages".to_string());
        let out = with_env(&dir, &FakeWeb, |env| handle_get(&cmd, env)).unwrap();

        assert!(out.starts_with("## https://example.com/a\n\n```html\n<p>"));
        let saved = fs::read_to_string(dir.path().join("pages/example.com_a.md")).unwrap();
        assert_eq!(saved, "<p>https://example.com/a</p>");
    }

    #[test]
    fn test_page_instructions_without_engine_are_annotated() {
        let dir = TempDir::new().unwrap();
        let mut cmd = WebGetCommand {
            urls: vec!["https://example.com/a".to_string()],
            ..Default::default()
        };
        cmd.page.page_instructions = vec![InstructionBinding::new("summarize", "")];
        let out = with_env(&dir, &FakeWeb, |env| handle_get(&cmd, env)).unwrap();
        assert!(out.contains("> **Error:**"));
    }

    #[test]
    fn test_unavailable_provider_renders_inline_error() {
        let dir = TempDir::new().unwrap();
        let cmd = WebGetCommand {
            urls: vec!["https://example.com".to_string()],
            ..Default::default()
        };
        let out = with_env(&dir, &UnavailableWebProvider, |env| handle_get(&cmd, env)).unwrap();
        assert!(out.starts_with("## https://example.com\n\n> **Error:**"));
    }
}
