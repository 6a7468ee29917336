// src/bin/mdweave.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use log::LevelFilter;
use mdweave::{
    cli::{Cli, dispatcher, handlers::help, should_colorize},
    core::{
        aliases,
        expander::{self, Expander},
        grammar::{self, ParseOutcome, USAGE_TOPIC},
    },
    state::{AppContext, GlobalFlags},
    system::{instructions::ExternalInstructionProcessor, web::UnavailableWebProvider},
    t,
};

/// The main entry point of the `mdweave` application.
/// It sets up logging from the verbosity flags, runs the pipeline and performs centralized
/// error handling.
fn main() {
    let cli = Cli::parse();
    let flags = GlobalFlags::scan(&cli.args);
    init_logging(flags);

    if let Err(e) = run_cli(cli.args, flags) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Installs the logger. The level starts from the command-line flags and is raised by
/// [`apply_log_level`] as flags from expanded files and aliases are found.
fn init_logging(flags: GlobalFlags) {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .format_timestamp(None)
        .init();
    apply_log_level(flags);
}

/// `--debug` and `--verbose` set the level; an explicit `RUST_LOG` takes precedence.
fn apply_log_level(flags: GlobalFlags) {
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(flags.log_level());
    }
}

/// Expands the raw arguments, parses them into commands and runs them.
fn run_cli(raw_args: Vec<String>, flags: GlobalFlags) -> Result<()> {
    let ctx = AppContext::from_environment(flags)?;

    if raw_args.is_empty() {
        println!("{}", help::render_help(USAGE_TOPIC, should_colorize()));
        return Ok(());
    }

    let tokens = expander::with_default_options(raw_args.clone(), &ctx);
    let tokens = Expander::new(&ctx).expand(&tokens)?;
    let flags = flags.merge(GlobalFlags::scan(&tokens));
    apply_log_level(flags);
    log::debug!("Expanded tokens: {:?}", tokens);

    let parsed = match grammar::parse(tokens, &ctx) {
        Ok(ParseOutcome::Parsed(parsed)) => parsed,
        Ok(ParseOutcome::HelpRequested { topic }) => {
            println!("{}", help::render_help(&topic, should_colorize()));
            return Ok(());
        }
        Err(e) => {
            let topic = e.command_name().unwrap_or(USAGE_TOPIC);
            eprintln!("{}", help::render_help(topic, should_colorize()));
            return Err(e.into());
        }
    };

    if let Some(name) = &parsed.save_alias {
        let body = aliases::alias_body(&raw_args, name);
        let path = aliases::save_alias(&ctx.local_alias_dir(), name, &body)?;
        println!(
            "{}",
            format!(t!("alias.success.saved"), name = name, path = path.display()).green()
        );
        return Ok(());
    }

    let flags = flags.merge(parsed.flags);
    apply_log_level(flags);
    let instructions = ExternalInstructionProcessor::from_env(&ctx.working_dir);
    dispatcher::dispatch(
        &parsed.commands,
        flags,
        &ctx,
        &instructions,
        &UnavailableWebProvider,
    )
}
