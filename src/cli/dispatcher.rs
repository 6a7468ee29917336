use anyhow::{Result, anyhow};
use colored::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::Path;

use crate::{
    cli::handlers::{self, commons::RunEnv},
    constants::DEFAULT_SAVE_OUTPUT_TEMPLATE,
    models::Command,
    state::{AppContext, GlobalFlags},
    system::{instructions::InstructionProcessor, web::WebProvider},
};

/// The worker count for a run: the largest `--threads` of any command, but never fewer than
/// the host's available parallelism.
pub fn pool_size(commands: &[Command]) -> usize {
    let requested = commands
        .iter()
        .filter_map(|c| c.shared().threads)
        .max()
        .unwrap_or(0);
    let available = std::thread::available_parallelism().map_or(1, |n| n.get());
    requested.max(available)
}

/// Builds the pool that bounds concurrent per-file and per-page work.
pub fn build_pool(commands: &[Command]) -> Result<ThreadPool> {
    let size = pool_size(commands);
    log::debug!("Using a pool of {} worker thread(s)", size);
    Ok(ThreadPoolBuilder::new().num_threads(size).build()?)
}

/// Runs one command and returns its final output: the handler's Markdown with the shared
/// instructions applied, saved when `--save-output` is set.
pub fn execute_command(command: &Command, env: &RunEnv<'_>) -> Result<String> {
    log::debug!("Executing '{}' command", command.name());
    let output = match command {
        Command::FindFiles(c) => handlers::find_files::handle(c, env)?,
        Command::WebSearch(c) => handlers::web::handle_search(c, env)?,
        Command::WebGet(c) => handlers::web::handle_get(c, env)?,
        Command::Run(c) => handlers::run::handle(c, env)?,
        Command::Export(c) => handlers::export::handle(c, env)?,
        Command::Help(c) => handlers::help::handle(c)?,
        Command::Version(_) => handlers::version::handle(),
    };

    let shared = command.shared();
    let output = env
        .instructions
        .apply(&shared.instructions, &output, shared.use_built_in_functions);

    if let Some(template) = &shared.save_output {
        handlers::commons::save_text(
            template,
            Path::new(DEFAULT_SAVE_OUTPUT_TEMPLATE),
            &output,
            &env.ctx.working_dir,
        )?;
    }
    Ok(output)
}

/// Runs every command in order, each as many times as its `--repeat` asks.
///
/// A failing command is reported and does not stop the ones after it; the run as a whole
/// fails if any command did.
pub fn dispatch(
    commands: &[Command],
    flags: GlobalFlags,
    ctx: &AppContext,
    instructions: &dyn InstructionProcessor,
    web: &dyn WebProvider,
) -> Result<()> {
    let pool = build_pool(commands)?;
    let env = RunEnv {
        ctx,
        instructions,
        web,
        pool: &pool,
    };

    let mut failures = 0;
    for command in commands {
        let repeat = command.shared().repeat.unwrap_or(1);
        for iteration in 0..repeat {
            if repeat > 1 {
                log::info!("'{}' iteration {} of {}", command.name(), iteration + 1, repeat);
            }
            match execute_command(command, &env) {
                Ok(output) => {
                    if !flags.quiet {
                        println!("{}", output.trim_end());
                    }
                }
                Err(e) => {
                    failures += 1;
                    eprintln!("{}: {:#}", "Error".red().bold(), e);
                }
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!(t!("dispatch.error.failed_commands"), count = failures));
    }
    Ok(())
}
