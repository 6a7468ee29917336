// src/cli/handlers/find_files.rs

use crate::{
    cli::handlers::commons::{self, RunEnv},
    core::{
        discovery::{self, Discovery, FileQuery},
        line_window,
        markdown::{self, fence_for, language_for},
    },
    models::{FindFilesCommand, instructions_for},
};
use anyhow::Result;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Runs a find-files command and returns its Markdown.
///
/// Files are rendered in parallel on the run's pool; sections keep the discovery order.
pub fn handle(cmd: &FindFilesCommand, env: &RunEnv<'_>) -> Result<String> {
    let root = env.ctx.working_dir.as_path();
    let query = FileQuery::from_command(cmd).with_ignored(discovery::load_ignore_file(root));

    let files = match env.pool.install(|| discovery::find_files(root, &query)) {
        Discovery::Found(files) => files,
        Discovery::NoFilesFound => {
            return Ok(markdown::no_match_section(&cmd.globs, t!("find.info.no_files_found")));
        }
        Discovery::NoFilesMatched => {
            return Ok(markdown::no_match_section(&cmd.globs, t!("find.info.no_files_matched")));
        }
    };
    log::info!("Rendering {} file(s)", files.len());

    let sections: Vec<String> = env.pool.install(|| {
        files
            .par_iter()
            .map(|path| render_file(path, cmd, env))
            .collect::<Vec<_>>()
    })
    .into_iter()
    .flatten()
    .collect();

    if sections.is_empty() {
        return Ok(markdown::no_match_section(&cmd.globs, t!("find.info.no_lines_matched")));
    }
    Ok(markdown::join_sections(&sections))
}

/// Renders one file, or `None` when the line filters select nothing.
fn render_file(path: &Path, cmd: &FindFilesCommand, env: &RunEnv<'_>) -> Option<String> {
    let root = env.ctx.working_dir.as_path();
    let display = discovery::display_path(root, path);

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Could not read '{}': {}", display, e);
            return Some(markdown::error_section(
                &display,
                &format!(t!("find.error.read_failed"), error = e),
            ));
        }
    };

    let fence = fence_for(&text, language_for(path));
    let body = if cmd.has_line_filters() {
        let lines: Vec<&str> = text.lines().collect();
        let formatted = line_window::format(
            &lines,
            &cmd.include_line_contains,
            &cmd.remove_all_lines,
            cmd.lines_before,
            cmd.lines_after,
            cmd.line_numbers,
            &fence,
        );
        if formatted.is_empty() {
            log::debug!("No lines selected in '{}'", display);
            return None;
        }
        formatted
    } else {
        text.trim_end_matches(['\r', '\n']).to_string()
    };

    let mut section = markdown::file_section(&display, &body, &fence);

    let instructions = instructions_for(&cmd.file_instructions, &display);
    if !instructions.is_empty() {
        section = env
            .instructions
            .apply(&instructions, &section, cmd.shared.use_built_in_functions);
    }

    if let Some(template) = &cmd.save_file_output
        && let Err(e) = commons::save_text(template, Path::new(&display), &section, root)
    {
        log::warn!("Could not save output for '{}': {:#}", display, e);
        commons::append_error(&mut section, &format!("{:#}", e));
    }

    Some(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::patterns::compile_regexes;
    use crate::models::InstructionBinding;
    use crate::state::{AppContext, StdinCache};
    use crate::system::{instructions::InstructionProcessor, web::UnavailableWebProvider};
    use rayon::ThreadPoolBuilder;
    use tempfile::TempDir;

    /// Records nothing; tags content so tests can see where instructions were applied.
    struct TaggingProcessor;

    impl InstructionProcessor for TaggingProcessor {
        fn apply(&self, instructions: &[String], content: &str, _use_built_ins: bool) -> String {
            format!("[{}]\n{}", instructions.join("|"), content)
        }
    }

    fn run(dir: &TempDir, cmd: &FindFilesCommand) -> String {
        let ctx = AppContext::rooted(dir.path(), StdinCache::preloaded(vec![]));
        let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let env = RunEnv {
            ctx: &ctx,
            instructions: &TaggingProcessor,
            web: &UnavailableWebProvider,
            pool: &pool,
        };
        handle(cmd, &env).unwrap()
    }

    fn command(globs: &[&str]) -> FindFilesCommand {
        FindFilesCommand {
            globs: globs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_whole_files_in_discovery_order() {
        // --- Setup ---
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.rs"), "fn b() {}\n").unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();

        // --- Execute ---
        let out = run(&dir, &command(&["*.rs"]));

        // --- Assert ---
        assert_eq!(
            out,
            "## a.rs\n\n```rust\nfn a() {}\n```\n\n## b.rs\n\n```rust\nfn b() {}\n```"
        );
    }

    #[test]
    fn test_line_filters_with_numbers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "a\nb\nc\nd\ne\n").unwrap();

        let mut cmd = command(&["notes.txt"]);
        cmd.include_line_contains = compile_regexes(&["c"]).unwrap();
        cmd.lines_before = 1;
        cmd.lines_after = 1;
        cmd.line_numbers = true;

        assert_eq!(run(&dir, &cmd), "## notes.txt\n\n```\n2: b\n3: c\n4: d\n```");
    }

    #[test]
    fn test_no_match_conditions_are_distinct() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha\nbeta\n").unwrap();

        let out = run(&dir, &command(&["*.md"]));
        assert!(out.contains(t!("find.info.no_files_found")));

        let mut cmd = command(&["*.txt"]);
        cmd.include_file_contains = compile_regexes(&["gamma"]).unwrap();
        assert!(run(&dir, &cmd).contains(t!("find.info.no_files_matched")));

        // The file matches at file level, but no single line has both words.
        let mut cmd = command(&["*.txt"]);
        let both = compile_regexes(&["alpha", "beta"]).unwrap();
        cmd.include_file_contains = both.clone();
        cmd.include_line_contains = both;
        assert!(run(&dir, &cmd).contains(t!("find.info.no_lines_matched")));
    }

    #[test]
    fn test_file_instructions_and_saved_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        fs::write(dir.path().join("b.md"), "# b\n").unwrap();

        let mut cmd = command(&["a.rs", "b.md"]);
        cmd.file_instructions = vec![InstructionBinding::new("explain", "rs")];
        cmd.save_file_output = Some("out/{fileBase}.md".to_string());

        let out = run(&dir, &cmd);
        assert!(out.starts_with("[explain]\n## a.rs"));
        assert!(out.contains("\n\n## b.md"));

        let saved = fs::read_to_string(dir.path().join("out/a.md")).unwrap();
        assert!(saved.starts_with("[explain]\n## a.rs"));
        assert!(dir.path().join("out/b.md").is_file());
    }
}
