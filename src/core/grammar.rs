// src/core/grammar.rs

//! # Command Grammar
//!
//! Turns the flat token stream produced by the [`expander`](super::expander) into an ordered
//! list of [`Command`]s.
//!
//! ## Rules
//!
//! - With no active command, up to two tokens are peeked to recognize a command name
//!   (`web search`, `web get`, `help`, `run`, `export`, `version`). Anything else starts a
//!   find-files command without consuming the token.
//! - `--` closes the active command (validating it); `--and` is a no-op.
//! - Options are tried as global, then shared, then command-specific. An unrecognized
//!   `--NAME` is looked up as an alias and its tokens are spliced in place; if there is no
//!   such alias the parse fails.
//! - List options are greedy up to the next `--` token; optional-value options take at
//!   most one following non-option token.
//! - Bare tokens are positional: globs, script lines, search terms, URLs, help topic words
//!   or export inputs depending on the active command.
//!
//! Each option rule reads the tokens after the option and reports how many it consumed,
//! so the cursor only moves in [`Parser::run`].

use crate::{
    constants::{
        AND_SEPARATOR, COMMAND_SEPARATOR, DEFAULT_SAVE_FILE_OUTPUT_TEMPLATE,
        DEFAULT_SAVE_OUTPUT_TEMPLATE, DEFAULT_SAVE_PAGE_OUTPUT_TEMPLATE,
    },
    core::{
        aliases,
        expander::{ExpandError, Expander},
        patterns::{self, PatternError},
    },
    models::{
        Command, ExportCommand, FindFilesCommand, HelpCommand, InstructionBinding, PageOptions,
        RunCommand, ScriptShell, SearchEngine, SharedOptions, VersionCommand, WebGetCommand,
        WebSearchCommand,
    },
    state::{AppContext, GlobalFlags},
};
use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;

/// The help topic used when no command is active.
pub const USAGE_TOPIC: &str = "usage";

/// Errors that abort a parse. Every variant names the command that owned the offending
/// token so the caller can print the matching usage block.
#[derive(Error, Debug)]
pub enum ParseError {
    /// An option that neither the command nor any alias recognizes.
    #[error("Invalid argument '{token}' for command '{command}'")]
    UnknownOption {
        /// The offending token.
        token: String,
        /// The active command.
        command: String,
    },
    /// A positional argument the command does not accept.
    #[error("Unexpected argument '{token}' for command '{command}'")]
    UnexpectedArgument {
        /// The offending token.
        token: String,
        /// The active command.
        command: String,
    },
    /// An option whose required value is missing.
    #[error("Missing {expected} for '{option}' in command '{command}'")]
    MissingValue {
        /// The option.
        option: String,
        /// What was expected ("thread count", "line count", ...).
        expected: &'static str,
        /// The active command.
        command: String,
    },
    /// An option whose value is not a valid number.
    #[error("Invalid {expected} for '{option}' in command '{command}': '{value}'")]
    InvalidNumber {
        /// The option.
        option: String,
        /// What was expected.
        expected: &'static str,
        /// The value as typed.
        value: String,
        /// The active command.
        command: String,
    },
    /// A regex or glob argument that does not compile.
    #[error("Invalid pattern for '{option}' in command '{command}': {source}")]
    Pattern {
        /// The option (or `<glob>` for positional globs).
        option: String,
        /// The active command.
        command: String,
        /// The compile error.
        #[source]
        source: PatternError,
    },
    /// An alias that exists but could not be read or expanded.
    #[error("Could not expand alias '--{name}': {source}")]
    Alias {
        /// The alias name.
        name: String,
        /// The expansion error.
        #[source]
        source: ExpandError,
    },
}

impl ParseError {
    /// The command the error belongs to, when known.
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Self::UnknownOption { command, .. }
            | Self::UnexpectedArgument { command, .. }
            | Self::MissingValue { command, .. }
            | Self::InvalidNumber { command, .. }
            | Self::Pattern { command, .. } => Some(command),
            Self::Alias { .. } => None,
        }
    }
}

/// A successful parse.
#[derive(Debug)]
pub struct ParsedInput {
    /// The complete commands, in input order.
    pub commands: Vec<Command>,
    /// Verbosity flags seen anywhere in the stream.
    pub flags: GlobalFlags,
    /// The alias name given with `--save-alias`, if any.
    pub save_alias: Option<String>,
}

/// The result of a parse that did not fail.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The stream parsed into commands.
    Parsed(ParsedInput),
    /// Help was requested (explicitly with `--help`, or because nothing complete was typed).
    HelpRequested {
        /// The help topic, usually a command name.
        topic: String,
    },
}

/// Parses an expanded token stream.
pub fn parse(tokens: Vec<String>, ctx: &AppContext) -> Result<ParseOutcome, ParseError> {
    Parser::new(tokens, ctx).run()
}

// --- PARSER STATE ---

/// What an option rule did with the tokens after an option.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// The option was recognized and consumed this many argument tokens.
    Consumed(usize),
    /// The option is not handled by this rule.
    NotMatched,
    /// `--help`.
    Help,
}

/// State that outlives a single command.
#[derive(Debug, Default)]
struct Collected {
    commands: Vec<Command>,
    flags: GlobalFlags,
    save_alias: Option<String>,
    last_empty: Option<&'static str>,
}

impl Collected {
    /// Closes a command: empty commands are dropped (remembered for help defaulting),
    /// others are validated and committed.
    fn close(&mut self, command: Command) -> Result<(), ParseError> {
        if command.is_empty() {
            log::debug!("Dropping empty '{}' command", command.name());
            self.last_empty = Some(command.name());
            return Ok(());
        }
        let command = command.validate()?;
        log::debug!("Committed '{}' command", command.name());
        self.commands.push(command);
        Ok(())
    }
}

#[derive(Debug)]
struct Parser<'a> {
    tokens: Vec<String>,
    ctx: &'a AppContext,
    collected: Collected,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<String>, ctx: &'a AppContext) -> Self {
        Self {
            tokens,
            ctx,
            collected: Collected::default(),
        }
    }

    fn run(mut self) -> Result<ParseOutcome, ParseError> {
        let mut pos = 0;
        let mut current: Option<Command> = None;

        while let Some(token) = self.tokens.get(pos).cloned() {
            if token == AND_SEPARATOR {
                pos += 1;
                continue;
            }
            if token == COMMAND_SEPARATOR {
                if let Some(done) = current.take() {
                    self.collected.close(done)?;
                }
                pos += 1;
                continue;
            }
            if current.is_none() {
                if token == "--help" {
                    return Ok(ParseOutcome::HelpRequested {
                        topic: USAGE_TOPIC.to_string(),
                    });
                }
                let (command, consumed) = start_command(self.tokens.get(pos..).unwrap_or_default());
                log::trace!("Starting '{}' command at token {}", command.name(), pos);
                current = Some(command);
                pos += consumed;
                continue;
            }
            let Some(command) = current.as_mut() else {
                continue;
            };

            let Some(name) = token.strip_prefix("--") else {
                parse_positional(command, &token)?;
                pos += 1;
                continue;
            };

            let args = OptionArgs {
                option: &token,
                command: command.name(),
                rest: self.tokens.get(pos + 1..).unwrap_or_default(),
            };
            match parse_option(&mut self.collected, command, name, &args)? {
                Step::Consumed(count) => pos += 1 + count,
                Step::Help => {
                    return Ok(ParseOutcome::HelpRequested {
                        topic: command.name().to_string(),
                    });
                }
                Step::NotMatched => match resolve_alias(self.ctx, name)? {
                    Some(alias_tokens) => {
                        log::debug!(
                            "Expanding alias '--{}' into {} token(s)",
                            name,
                            alias_tokens.len()
                        );
                        self.tokens.splice(pos..=pos, alias_tokens);
                    }
                    None => {
                        return Err(ParseError::UnknownOption {
                            token,
                            command: command.name().to_string(),
                        });
                    }
                },
            }
        }

        if let Some(done) = current.take() {
            self.collected.close(done)?;
        }

        let Collected {
            commands,
            flags,
            save_alias,
            last_empty,
        } = self.collected;

        if commands.is_empty() && save_alias.is_none() {
            return Ok(ParseOutcome::HelpRequested {
                topic: last_empty.unwrap_or(USAGE_TOPIC).to_string(),
            });
        }

        Ok(ParseOutcome::Parsed(ParsedInput {
            commands,
            flags,
            save_alias,
        }))
    }
}

/// Recognizes a command name at the start of `tokens`, returning the new command and the
/// number of name tokens consumed.
fn start_command(tokens: &[String]) -> (Command, usize) {
    let first = tokens.first().map(String::as_str);
    let second = tokens.get(1).map(String::as_str);
    match (first, second) {
        (Some("web"), Some("search")) => (Command::WebSearch(WebSearchCommand::default()), 2),
        (Some("web"), Some("get")) => (Command::WebGet(WebGetCommand::default()), 2),
        (Some("help"), _) => (Command::Help(HelpCommand::default()), 1),
        (Some("run"), _) => (Command::Run(RunCommand::default()), 1),
        (Some("export"), _) => (Command::Export(ExportCommand::default()), 1),
        (Some("version"), _) => (Command::Version(VersionCommand::default()), 1),
        _ => (Command::FindFiles(FindFilesCommand::default()), 0),
    }
}

fn resolve_alias(ctx: &AppContext, name: &str) -> Result<Option<Vec<String>>, ParseError> {
    let lines = aliases::load_alias(ctx, name).map_err(|source| ParseError::Alias {
        name: name.to_string(),
        source: ExpandError::Read {
            path: PathBuf::from(name),
            source,
        },
    })?;
    let Some(lines) = lines else {
        return Ok(None);
    };
    Expander::new(ctx)
        .expand_lines(&lines)
        .map(Some)
        .map_err(|source| ParseError::Alias {
            name: name.to_string(),
            source,
        })
}

// --- OPTION ARGUMENTS ---

/// The tokens following an option, with the context needed to report errors.
#[derive(Debug)]
struct OptionArgs<'r> {
    option: &'r str,
    command: &'static str,
    rest: &'r [String],
}

impl<'r> OptionArgs<'r> {
    /// All following tokens up to the next `--` token. At least one is required.
    fn list(&self, expected: &'static str) -> Result<&'r [String], ParseError> {
        let end = self
            .rest
            .iter()
            .position(|t| t.starts_with("--"))
            .unwrap_or(self.rest.len());
        match self.rest.get(..end) {
            Some(values) if !values.is_empty() => Ok(values),
            _ => Err(self.missing(expected)),
        }
    }

    /// The following token, if it is not an option.
    fn optional(&self) -> Option<&'r str> {
        self.rest
            .first()
            .map(String::as_str)
            .filter(|t| !t.starts_with("--"))
    }

    /// The following token, which must be present.
    fn value(&self, expected: &'static str) -> Result<&'r str, ParseError> {
        self.optional().ok_or_else(|| self.missing(expected))
    }

    /// The following token parsed as a non-negative integer.
    fn number(&self, expected: &'static str) -> Result<usize, ParseError> {
        let raw = self.value(expected)?;
        raw.parse::<usize>()
            .map_err(|_| ParseError::InvalidNumber {
                option: self.option.to_string(),
                expected,
                value: raw.to_string(),
                command: self.command.to_string(),
            })
    }

    /// Like [`Self::number`], but zero is rejected.
    fn positive_number(&self, expected: &'static str) -> Result<usize, ParseError> {
        match self.number(expected)? {
            0 => Err(ParseError::InvalidNumber {
                option: self.option.to_string(),
                expected,
                value: "0".to_string(),
                command: self.command.to_string(),
            }),
            n => Ok(n),
        }
    }

    /// A list of regular expressions, compiled immediately.
    fn regexes(&self) -> Result<(Vec<Regex>, usize), ParseError> {
        let values = self.list("regular expression")?;
        let compiled = patterns::compile_regexes(values).map_err(|e| self.pattern_error(e))?;
        Ok((compiled, values.len()))
    }

    fn missing(&self, expected: &'static str) -> ParseError {
        ParseError::MissingValue {
            option: self.option.to_string(),
            expected,
            command: self.command.to_string(),
        }
    }

    fn pattern_error(&self, source: PatternError) -> ParseError {
        ParseError::Pattern {
            option: self.option.to_string(),
            command: self.command.to_string(),
            source,
        }
    }
}

// --- OPTION TABLES ---

/// Tries the global, shared and command-specific option tables in order.
fn parse_option(
    collected: &mut Collected,
    command: &mut Command,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    let step = parse_global_option(collected, name, args)?;
    if step != Step::NotMatched {
        return Ok(step);
    }
    let step = parse_shared_option(command.shared_mut(), name, args)?;
    if step != Step::NotMatched {
        return Ok(step);
    }
    match command {
        Command::FindFiles(c) => parse_find_files_option(c, name, args),
        Command::WebSearch(c) => parse_web_search_option(c, name, args),
        Command::WebGet(c) => parse_page_option(&mut c.page, name, args),
        Command::Run(c) => parse_run_option(c, name, args),
        Command::Export(c) => parse_export_option(c, name, args),
        Command::Help(_) | Command::Version(_) => Ok(Step::NotMatched),
    }
}

fn parse_global_option(
    collected: &mut Collected,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    match name {
        "help" => Ok(Step::Help),
        "debug" => {
            collected.flags.debug = true;
            Ok(Step::Consumed(0))
        }
        "verbose" => {
            collected.flags.verbose = true;
            Ok(Step::Consumed(0))
        }
        "quiet" => {
            collected.flags.quiet = true;
            Ok(Step::Consumed(0))
        }
        "save-alias" => {
            let alias_name = args.value("alias name")?;
            collected.save_alias = Some(alias_name.to_string());
            Ok(Step::Consumed(1))
        }
        _ => Ok(Step::NotMatched),
    }
}

fn parse_shared_option(
    shared: &mut SharedOptions,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    match name {
        "instructions" => {
            let values = args.list("instructions")?;
            shared.instructions.extend(values.iter().cloned());
            Ok(Step::Consumed(values.len()))
        }
        "built-in-functions" => {
            shared.use_built_in_functions = true;
            Ok(Step::Consumed(0))
        }
        "save-output" => {
            let template = args.optional();
            shared.save_output = Some(template.unwrap_or(DEFAULT_SAVE_OUTPUT_TEMPLATE).to_string());
            Ok(Step::Consumed(usize::from(template.is_some())))
        }
        "threads" => {
            shared.threads = Some(args.positive_number("thread count")?);
            Ok(Step::Consumed(1))
        }
        "repeat" => {
            shared.repeat = Some(args.positive_number("repeat count")?);
            Ok(Step::Consumed(1))
        }
        _ => Ok(Step::NotMatched),
    }
}

fn parse_find_files_option(
    cmd: &mut FindFilesCommand,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    match name {
        "exclude" => {
            let values = args.list("exclude pattern")?;
            let split =
                patterns::split_exclude_patterns(values).map_err(|e| args.pattern_error(e))?;
            cmd.exclude_globs.extend(split.globs);
            cmd.exclude_file_name_patterns.extend(split.file_names);
            Ok(Step::Consumed(values.len()))
        }
        "contains" => {
            let (regexes, count) = args.regexes()?;
            cmd.include_file_contains.extend(regexes.iter().cloned());
            cmd.include_line_contains.extend(regexes);
            Ok(Step::Consumed(count))
        }
        "file-contains" => {
            let (regexes, count) = args.regexes()?;
            cmd.include_file_contains.extend(regexes);
            Ok(Step::Consumed(count))
        }
        "file-not-contains" => {
            let (regexes, count) = args.regexes()?;
            cmd.exclude_file_contains.extend(regexes);
            Ok(Step::Consumed(count))
        }
        "line-contains" => {
            let (regexes, count) = args.regexes()?;
            cmd.include_line_contains.extend(regexes);
            Ok(Step::Consumed(count))
        }
        "remove-all-lines" => {
            let (regexes, count) = args.regexes()?;
            cmd.remove_all_lines.extend(regexes);
            Ok(Step::Consumed(count))
        }
        "lines" => {
            let count = args.number("line count")?;
            cmd.lines_before = count;
            cmd.lines_after = count;
            Ok(Step::Consumed(1))
        }
        "lines-before" => {
            cmd.lines_before = args.number("line count")?;
            Ok(Step::Consumed(1))
        }
        "lines-after" => {
            cmd.lines_after = args.number("line count")?;
            Ok(Step::Consumed(1))
        }
        "line-numbers" => {
            cmd.line_numbers = true;
            Ok(Step::Consumed(0))
        }
        "save-file-output" => {
            let template = args.optional();
            cmd.save_file_output =
                Some(template.unwrap_or(DEFAULT_SAVE_FILE_OUTPUT_TEMPLATE).to_string());
            Ok(Step::Consumed(usize::from(template.is_some())))
        }
        _ => match instruction_criteria(name, "file-instructions") {
            Some(criteria) => {
                let values = args.list("instructions")?;
                cmd.file_instructions.extend(
                    values
                        .iter()
                        .map(|text| InstructionBinding::new(text.clone(), criteria)),
                );
                Ok(Step::Consumed(values.len()))
            }
            None => Ok(Step::NotMatched),
        },
    }
}

fn parse_web_search_option(
    cmd: &mut WebSearchCommand,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    let engine = match name {
        "google" => Some(SearchEngine::Google),
        "bing" => Some(SearchEngine::Bing),
        "duckduckgo" => Some(SearchEngine::DuckDuckGo),
        "yahoo" => Some(SearchEngine::Yahoo),
        _ => None,
    };
    if let Some(engine) = engine {
        cmd.engine = engine;
        return Ok(Step::Consumed(0));
    }
    match name {
        "max" => {
            cmd.max_results = args.positive_number("result count")?;
            Ok(Step::Consumed(1))
        }
        "get" => {
            cmd.get_pages = true;
            Ok(Step::Consumed(0))
        }
        _ => parse_page_option(&mut cmd.page, name, args),
    }
}

fn parse_page_option(
    page: &mut PageOptions,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    match name {
        "strip" => {
            page.strip_html = true;
            Ok(Step::Consumed(0))
        }
        "interactive" => {
            page.interactive = true;
            Ok(Step::Consumed(0))
        }
        "save-page-folder" => {
            page.save_page_folder = Some(args.value("folder")?.to_string());
            Ok(Step::Consumed(1))
        }
        "save-page-output" => {
            let template = args.optional();
            page.save_page_output =
                Some(template.unwrap_or(DEFAULT_SAVE_PAGE_OUTPUT_TEMPLATE).to_string());
            Ok(Step::Consumed(usize::from(template.is_some())))
        }
        _ => match instruction_criteria(name, "page-instructions") {
            Some(criteria) => {
                let values = args.list("instructions")?;
                page.page_instructions.extend(
                    values
                        .iter()
                        .map(|text| InstructionBinding::new(text.clone(), criteria)),
                );
                Ok(Step::Consumed(values.len()))
            }
            None => Ok(Step::NotMatched),
        },
    }
}

fn parse_run_option(
    cmd: &mut RunCommand,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    match name {
        "script" => {
            let values = args.list("script")?;
            for line in values {
                cmd.append_line(line);
            }
            Ok(Step::Consumed(values.len()))
        }
        "bash" => {
            cmd.shell = ScriptShell::Bash;
            Ok(Step::Consumed(0))
        }
        "cmd" => {
            cmd.shell = ScriptShell::Cmd;
            Ok(Step::Consumed(0))
        }
        "powershell" => {
            cmd.shell = ScriptShell::PowerShell;
            Ok(Step::Consumed(0))
        }
        _ => Ok(Step::NotMatched),
    }
}

fn parse_export_option(
    cmd: &mut ExportCommand,
    name: &str,
    args: &OptionArgs<'_>,
) -> Result<Step, ParseError> {
    match name {
        "output" => {
            cmd.output = Some(args.value("output file")?.to_string());
            Ok(Step::Consumed(1))
        }
        "format" => {
            cmd.format = Some(args.value("format name")?.to_lowercase());
            Ok(Step::Consumed(1))
        }
        _ => Ok(Step::NotMatched),
    }
}

/// Extracts the criteria from `SUFFIX` (empty criteria) or `CRITERIA-SUFFIX`.
fn instruction_criteria<'n>(name: &'n str, suffix: &str) -> Option<&'n str> {
    if name == suffix {
        return Some("");
    }
    name.strip_suffix(suffix)
        .and_then(|prefix| prefix.strip_suffix('-'))
        .filter(|criteria| !criteria.is_empty())
}

// --- POSITIONAL ARGUMENTS ---

fn parse_positional(command: &mut Command, token: &str) -> Result<(), ParseError> {
    match command {
        Command::FindFiles(c) => {
            patterns::validate_glob(token).map_err(|source| ParseError::Pattern {
                option: "<glob>".to_string(),
                command: "find".to_string(),
                source,
            })?;
            c.add_glob(token);
        }
        Command::WebSearch(c) => c.terms.push(token.to_string()),
        Command::WebGet(c) => c.urls.push(token.to_string()),
        Command::Run(c) => c.append_line(token),
        Command::Help(c) => c.topic.push(token.to_string()),
        Command::Export(c) => c.inputs.push(token.to_string()),
        Command::Version(_) => {
            return Err(ParseError::UnexpectedArgument {
                token: token.to_string(),
                command: command.name().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StdinCache;
    use std::fs;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        AppContext::rooted(dir.path(), StdinCache::preloaded(vec![]))
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn parse_ok(ctx: &AppContext, items: &[&str]) -> ParsedInput {
        match parse(tokens(items), ctx).unwrap() {
            ParseOutcome::Parsed(input) => input,
            other => panic!("expected commands, got {:?}", other),
        }
    }

    fn find_files(command: &Command) -> &FindFilesCommand {
        match command {
            Command::FindFiles(c) => c,
            other => panic!("expected find-files, got {:?}", other),
        }
    }

    fn patterns_of(regexes: &[Regex]) -> Vec<&str> {
        regexes.iter().map(Regex::as_str).collect()
    }

    #[test]
    fn test_bare_tokens_become_deduplicated_globs() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["**/*.rs", "*.md", "**/*.rs"]);
        assert_eq!(input.commands.len(), 1);
        assert_eq!(find_files(&input.commands[0]).globs, vec!["**/*.rs", "*.md"]);
    }

    #[test]
    fn test_find_files_defaults_to_everything() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["--line-numbers"]);
        let cmd = find_files(&input.commands[0]);
        assert_eq!(cmd.globs, vec!["**"]);
        assert!(cmd.line_numbers);
    }

    #[test]
    fn test_two_word_and_one_word_commands() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(
            &context(&dir),
            &[
                "web", "search", "rust", "globs", "--max", "3", "--", "web", "get",
                "https://example.com", "--", "run", "echo hi", "--", "version",
            ],
        );
        let names: Vec<_> = input.commands.iter().map(Command::name).collect();
        assert_eq!(names, vec!["web search", "web get", "run", "version"]);
        match &input.commands[0] {
            Command::WebSearch(c) => {
                assert_eq!(c.terms, vec!["rust", "globs"]);
                assert_eq!(c.max_results, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_web_without_subcommand_is_a_glob() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["web", "*.rs"]);
        assert_eq!(find_files(&input.commands[0]).globs, vec!["web", "*.rs"]);
    }

    #[test]
    fn test_contains_sets_file_and_line_patterns() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["*.rs", "--contains", "fn main", "unsafe"]);
        let cmd = find_files(&input.commands[0]);
        assert_eq!(patterns_of(&cmd.include_file_contains), vec!["fn main", "unsafe"]);
        assert_eq!(patterns_of(&cmd.include_line_contains), vec!["fn main", "unsafe"]);
    }

    #[test]
    fn test_list_options_are_greedy_until_next_option() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(
            &context(&dir),
            &["--file-contains", "a", "b", "--line-contains", "c", "src"],
        );
        let cmd = find_files(&input.commands[0]);
        assert_eq!(patterns_of(&cmd.include_file_contains), vec!["a", "b"]);
        // `src` was swallowed by the greedy list, so the glob defaults to `**`.
        assert_eq!(patterns_of(&cmd.include_line_contains), vec!["c", "src"]);
        assert_eq!(cmd.globs, vec!["**"]);
    }

    #[test]
    fn test_optional_value_takes_at_most_one_token() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let input = parse_ok(&ctx, &["--save-file-output", "out/{fileBase}.md", "*.rs"]);
        let cmd = find_files(&input.commands[0]);
        assert_eq!(cmd.save_file_output.as_deref(), Some("out/{fileBase}.md"));
        assert_eq!(cmd.globs, vec!["*.rs"]);

        let input = parse_ok(&ctx, &["*.rs", "--save-output", "--line-numbers"]);
        let cmd = find_files(&input.commands[0]);
        assert_eq!(cmd.shared.save_output.as_deref(), Some("output.md"));
        assert!(cmd.line_numbers);
    }

    #[test]
    fn test_lines_sets_both_context_counts() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["*.rs", "--lines", "2", "--lines-after", "5"]);
        let cmd = find_files(&input.commands[0]);
        assert_eq!((cmd.lines_before, cmd.lines_after), (2, 5));
    }

    #[test]
    fn test_exclude_splits_globs_and_file_names() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["**", "--exclude", "target/**", "*.lock"]);
        let cmd = find_files(&input.commands[0]);
        assert_eq!(cmd.exclude_globs, vec!["target/**"]);
        assert_eq!(patterns_of(&cmd.exclude_file_name_patterns), vec![r"^.*\.lock$"]);
    }

    #[test]
    fn test_file_instruction_bindings() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(
            &context(&dir),
            &[
                "**",
                "--cs-file-instructions",
                "explain",
                "--file-instructions",
                "summarize",
            ],
        );
        let cmd = find_files(&input.commands[0]);
        assert_eq!(
            cmd.file_instructions,
            vec![
                InstructionBinding::new("explain", "cs"),
                InstructionBinding::new("summarize", ""),
            ]
        );
    }

    #[test]
    fn test_run_joins_positionals_into_script() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["run", "echo one", "--bash", "echo two"]);
        match &input.commands[0] {
            Command::Run(c) => {
                assert_eq!(c.script, "echo one\necho two");
                assert_eq!(c.shell, ScriptShell::Bash);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_separator_and_and_tokens() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(
            &context(&dir),
            &["--", "*.rs", "--and", "--line-numbers", "--", "--", "*.md"],
        );
        assert_eq!(input.commands.len(), 2);
        let first = find_files(&input.commands[0]);
        assert_eq!(first.globs, vec!["*.rs"]);
        assert!(first.line_numbers);
        assert_eq!(find_files(&input.commands[1]).globs, vec!["*.md"]);
    }

    #[test]
    fn test_unknown_option_names_command() {
        let dir = TempDir::new().unwrap();
        let err = parse(tokens(&["run", "ls", "--nope"]), &context(&dir)).unwrap_err();
        assert!(matches!(
            &err,
            ParseError::UnknownOption { token, command } if token == "--nope" && command == "run"
        ));
        assert_eq!(err.command_name(), Some("run"));
    }

    #[test]
    fn test_invalid_regex_names_option_and_pattern() {
        let dir = TempDir::new().unwrap();
        let err = parse(tokens(&["*.rs", "--line-contains", "(oops"]), &context(&dir)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("--line-contains"), "{}", message);
        assert!(matches!(err, ParseError::Pattern { .. }));
        assert!(format!("{:?}", err).contains("(oops"));
    }

    #[test]
    fn test_integer_options_are_strict() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let err = parse(tokens(&["*.rs", "--threads", "four"]), &ctx).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { expected: "thread count", .. }
        ));

        let err = parse(tokens(&["*.rs", "--lines"]), &ctx).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingValue { expected: "line count", .. }
        ));

        let err = parse(tokens(&["*.rs", "--lines", "-1"]), &ctx).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn test_help_requests() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let topic_of = |items: &[&str]| match parse(tokens(items), &ctx).unwrap() {
            ParseOutcome::HelpRequested { topic } => topic,
            other => panic!("expected help, got {:?}", other),
        };

        assert_eq!(topic_of(&[]), "usage");
        assert_eq!(topic_of(&["--help"]), "usage");
        assert_eq!(topic_of(&["web", "get", "--help"]), "web get");
        // An empty command drives the topic.
        assert_eq!(topic_of(&["web", "search"]), "web search");
        assert_eq!(topic_of(&["run", "--"]), "run");
    }

    #[test]
    fn test_help_command_collects_topic() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(&context(&dir), &["help", "web", "search"]);
        match &input.commands[0] {
            Command::Help(c) => assert_eq!(c.topic, vec!["web", "search"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_alias_is_equivalent_to_typed_tokens() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        aliases::save_alias(
            &ctx.local_alias_dir(),
            "myalias",
            &tokens(&["--line-numbers", "*.rs", "*.md"]),
        )
        .unwrap();

        let via_alias = parse_ok(&ctx, &["--myalias"]);
        let typed = parse_ok(&ctx, &["--line-numbers", "*.rs", "*.md"]);

        let a = find_files(&via_alias.commands[0]);
        let b = find_files(&typed.commands[0]);
        assert_eq!(a.globs, b.globs);
        assert_eq!(a.line_numbers, b.line_numbers);
        assert_eq!(a.globs, vec!["*.rs", "*.md"]);
    }

    #[test]
    fn test_alias_can_close_and_open_commands() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        fs::create_dir_all(ctx.local_alias_dir()).unwrap();
        fs::write(
            ctx.local_alias_dir().join("two.alias"),
            "--line-numbers\n--\nrun\necho hi\n",
        )
        .unwrap();

        let input = parse_ok(&ctx, &["*.rs", "--two"]);
        let names: Vec<_> = input.commands.iter().map(Command::name).collect();
        assert_eq!(names, vec!["find", "run"]);
        assert!(find_files(&input.commands[0]).line_numbers);
    }

    #[test]
    fn test_global_flags_and_save_alias() {
        let dir = TempDir::new().unwrap();
        let input = parse_ok(
            &context(&dir),
            &["*.rs", "--verbose", "--save-alias", "rusty", "--quiet"],
        );
        assert!(input.flags.verbose);
        assert!(input.flags.quiet);
        assert!(!input.flags.debug);
        assert_eq!(input.save_alias.as_deref(), Some("rusty"));
    }

    #[test]
    fn test_export_requires_output_and_version_rejects_arguments() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let err = parse(tokens(&["export", "a.md"]), &ctx).unwrap_err();
        assert!(matches!(err, ParseError::MissingValue { .. }));

        let err = parse(tokens(&["version", "now"]), &ctx).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedArgument { .. }));
    }

    #[test]
    fn test_instruction_criteria() {
        assert_eq!(instruction_criteria("file-instructions", "file-instructions"), Some(""));
        assert_eq!(instruction_criteria("md-file-instructions", "file-instructions"), Some("md"));
        assert_eq!(instruction_criteria("-file-instructions", "file-instructions"), None);
        assert_eq!(instruction_criteria("instructions", "file-instructions"), None);
    }
}
