use crate::{
    cli::handlers::commons::RunEnv,
    core::markdown::{self, fence_for},
    models::{RunCommand, ScriptShell},
    system::executor,
};
use anyhow::Result;

fn script_language(shell: ScriptShell) -> &'static str {
    match shell {
        ScriptShell::Sh | ScriptShell::Bash => "bash",
        ScriptShell::Cmd => "batch",
        ScriptShell::PowerShell => "powershell",
    }
}

/// Runs the script of a `run` command and renders the script with its output.
///
/// Execution failures are rendered inline; a non-zero exit code is reported, not raised.
pub fn handle(cmd: &RunCommand, env: &RunEnv<'_>) -> Result<String> {
    let title = t!("run.label.title");
    let script_fence = fence_for(&cmd.script, script_language(cmd.shell));
    let mut out = markdown::file_section(title, &cmd.script, &script_fence);

    log::info!("Running script with {:?}", cmd.shell);
    let captured = match executor::run_script(cmd.shell, &cmd.script, &env.ctx.working_dir) {
        Ok(captured) => captured,
        Err(e) => {
            log::warn!("{}", e);
            out.push('\n');
            out.push_str(&markdown::error_section(t!("run.label.output"), &e.to_string()));
            return Ok(out);
        }
    };

    for (label, stream) in [
        (t!("run.label.output"), &captured.stdout),
        (t!("run.label.errors"), &captured.stderr),
    ] {
        if stream.trim().is_empty() {
            continue;
        }
        let body = stream.trim_end_matches(['\r', '\n']);
        out.push('\n');
        out.push_str(&markdown::file_section(label, body, &fence_for(body, "")));
    }

    let code = captured
        .exit_code
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    out.push_str(&format!("\n{}\n", format!(t!("run.label.exit_code"), code = code)));
    Ok(out)
}
