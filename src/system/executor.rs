// src/system/executor.rs

//! Runs scripts and external commands, capturing what they print.

use crate::models::ScriptShell;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command as StdCommand, Output, Stdio};
use thiserror::Error;

/// Failures of a process launched by mdweave.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The command line has unbalanced quotes.
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    /// The command line holds no program.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The program could not be started or waited on.
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    /// The program ran but reported failure; carries its stderr.
    #[error("Command '{0}' exited with a non-zero error code: {1}")]
    NonZeroExitStatus(String, String),
    /// Standard output was not UTF-8.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        /// The program that produced the output.
        command: String,
        /// The decoding failure.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// What a finished script printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// The exit code, or `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

/// The program and leading arguments that hand a script body to `shell`.
fn shell_invocation(shell: ScriptShell) -> (&'static str, &'static [&'static str]) {
    match shell {
        ScriptShell::Sh => ("sh", &["-c"]),
        ScriptShell::Bash => ("bash", &["-c"]),
        ScriptShell::Cmd => ("cmd", &["/C"]),
        ScriptShell::PowerShell => ("pwsh", &["-NoProfile", "-Command"]),
    }
}

/// Runs `script` with `shell` in `cwd` and captures both output streams.
///
/// A non-zero exit code is not an error here; it is reported in the result.
pub fn run_script(shell: ScriptShell, script: &str, cwd: &Path) -> Result<CapturedOutput, ExecutionError> {
    if script.trim().is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }
    let (program, leading_args) = shell_invocation(shell);
    let clean_cwd = dunce::simplified(cwd);

    let spawn = |program: &str| {
        StdCommand::new(program)
            .args(leading_args)
            .arg(script)
            .current_dir(clean_cwd)
            .stdin(Stdio::null())
            .output()
    };

    // Windows PowerShell ships as `powershell`; `pwsh` is the cross-platform edition.
    let output = match spawn(program) {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound && shell == ScriptShell::PowerShell => {
            log::debug!("'{}' not found. Retrying with 'powershell'.", program);
            spawn("powershell").map_err(|e| ExecutionError::CommandFailed(program.to_string(), e))?
        }
        Err(e) => return Err(ExecutionError::CommandFailed(program.to_string(), e)),
    };

    log::debug!("Script finished with status {}", output.status);
    Ok(CapturedOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs `command_line` (split like a shell would) with `extra_args` appended, feeding
/// `input` on standard input, and returns its standard output.
pub fn run_with_input(
    command_line: &str,
    extra_args: &[String],
    input: &str,
    cwd: &Path,
) -> Result<String, ExecutionError> {
    let trimmed_command = command_line.trim();
    let parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?;
    let Some((program, args)) = parts.split_first() else {
        return Err(ExecutionError::EmptyCommand);
    };

    let mut child = StdCommand::new(program)
        .args(args)
        .args(extra_args)
        .current_dir(dunce::simplified(cwd))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(trimmed_command.to_string(), e))?;

    let stdin = child.stdin.take();
    let output: std::io::Result<Output> = std::thread::scope(|scope| {
        if let Some(mut stdin) = stdin {
            scope.spawn(move || {
                if let Err(e) = stdin.write_all(input.as_bytes()) {
                    log::debug!("Could not write to child stdin: {}", e);
                }
            });
        }
        child.wait_with_output()
    });
    let output = output.map_err(|e| ExecutionError::CommandFailed(trimmed_command.to_string(), e))?;

    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus(
            trimmed_command.to_string(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: trimmed_command.to_string(),
        source: e,
    })
}
