// src/cli/handlers/export.rs

use crate::{cli::handlers::commons::RunEnv, core::markdown, models::ExportCommand};
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

/// The formats written without an external converter.
const TEXT_FORMATS: &[&str] = &["md", "markdown", "txt"];

/// Concatenates the input Markdown files into `--output`.
///
/// The format comes from `--format` or the output file's extension. Formats that need a
/// document converter are reported inline.
pub fn handle(cmd: &ExportCommand, env: &RunEnv<'_>) -> Result<String> {
    let output = cmd
        .output
        .as_deref()
        .ok_or_else(|| anyhow!(t!("export.error.no_output")))?;
    let format = cmd
        .format
        .clone()
        .or_else(|| {
            Path::new(output)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
        })
        .unwrap_or_else(|| "md".to_string());

    if !TEXT_FORMATS.contains(&format.as_str()) {
        log::warn!("Unsupported export format '{}'", format);
        return Ok(markdown::error_section(
            output,
            &format!(t!("export.error.unsupported"), format = format),
        ));
    }

    let mut parts = Vec::with_capacity(cmd.inputs.len());
    for input in &cmd.inputs {
        let path = env.ctx.resolve(input);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Could not read export input '{}'", path.display()))?;
        parts.push(text.trim_end().to_string());
    }

    let target = env.ctx.resolve(output);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create directory '{}'", parent.display()))?;
    }
    let mut body = parts.join("\n\n");
    body.push('\n');
    fs::write(&target, body).with_context(|| format!("Could not write '{}'", target.display()))?;
    log::info!("Exported {} file(s) to '{}'", cmd.inputs.len(), target.display());

    Ok(format!(
        t!("export.success"),
        count = cmd.inputs.len(),
        path = target.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppContext, StdinCache};
    use crate::system::{instructions::ExternalInstructionProcessor, web::UnavailableWebProvider};
    use rayon::ThreadPoolBuilder;
    use tempfile::TempDir;

    fn run(dir: &TempDir, cmd: &ExportCommand) -> Result<String> {
        let ctx = AppContext::rooted(dir.path(), StdinCache::preloaded(vec![]));
        let pool = ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let instructions = ExternalInstructionProcessor::new(None, dir.path());
        let env = RunEnv {
            ctx: &ctx,
            instructions: &instructions,
            web: &UnavailableWebProvider,
            pool: &pool,
        };
        handle(cmd, &env)
    }

    fn export(inputs: &[&str], output: &str) -> ExportCommand {
        ExportCommand {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: Some(output.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_concatenates_markdown_inputs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# A\n\n").unwrap();
        fs::write(dir.path().join("b.md"), "# B\n").unwrap();

        run(&dir, &export(&["a.md", "b.md"], "out/all.md")).unwrap();
        let written = fs::read_to_string(dir.path().join("out/all.md")).unwrap();
        assert_eq!(written, "# A\n\n# B\n");
    }

    #[test]
    fn test_unsupported_format_is_inline() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# A\n").unwrap();
        let out = run(&dir, &export(&["a.md"], "report.docx")).unwrap();
        assert!(out.starts_with("## report.docx\n\n> **Error:**"));
        assert!(!dir.path().join("report.docx").exists());
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(run(&dir, &export(&["missing.md"], "out.md")).is_err());
    }
}
