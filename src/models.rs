// src/models.rs

//! The command records produced by the grammar and consumed by the dispatcher.
//!
//! [`Command`] is a closed sum type: every operation over commands (`name`, `is_empty`,
//! `validate`) is a single exhaustive `match`, so adding a command kind is a compile error
//! everywhere it must be handled.

use crate::constants::DEFAULT_MAX_SEARCH_RESULTS;
use crate::core::grammar::ParseError;
use regex::Regex;
use std::fmt;

// --- SHARED MODELS ---

/// Options every command kind accepts.
#[derive(Debug, Clone, Default)]
pub struct SharedOptions {
    /// `--instructions`: applied to the command's combined output.
    pub instructions: Vec<String>,
    /// `--built-in-functions`: lets the instruction engine use its built-in functions.
    pub use_built_in_functions: bool,
    /// `--save-output [TEMPLATE]`.
    pub save_output: Option<String>,
    /// `--threads N`.
    pub threads: Option<usize>,
    /// `--repeat N`.
    pub repeat: Option<usize>,
}

/// An instruction bound to the files (or pages) it applies to.
///
/// An empty `criteria` applies everywhere; otherwise the binding applies to names that
/// end with `criteria`, compared case-insensitively (`cs` matches `Program.cs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionBinding {
    /// The instruction text.
    pub instructions: String,
    /// The file-name suffix selecting the subjects.
    pub criteria: String,
}

impl InstructionBinding {
    /// Creates a new binding.
    pub fn new(instructions: impl Into<String>, criteria: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            criteria: criteria.into(),
        }
    }

    /// Whether this binding applies to the subject named `name`.
    pub fn applies_to(&self, name: &str) -> bool {
        self.criteria.is_empty() || name.to_lowercase().ends_with(&self.criteria.to_lowercase())
    }
}

/// Collects the instructions of every binding that applies to `name`, in declaration order.
pub fn instructions_for(bindings: &[InstructionBinding], name: &str) -> Vec<String> {
    bindings
        .iter()
        .filter(|b| b.applies_to(name))
        .map(|b| b.instructions.clone())
        .collect()
}

// --- FIND FILES ---

/// The default command: find files by glob, filter them and render them as Markdown.
#[derive(Debug, Clone, Default)]
pub struct FindFilesCommand {
    /// Include globs, first-seen order, without duplicates.
    pub globs: Vec<String>,
    /// Exclude globs.
    pub exclude_globs: Vec<String>,
    /// File names (not paths) matching any of these are excluded.
    pub exclude_file_name_patterns: Vec<Regex>,
    /// Every pattern must match the file content.
    pub include_file_contains: Vec<Regex>,
    /// No pattern may match the file content.
    pub exclude_file_contains: Vec<Regex>,
    /// Every pattern must match a line for it to be selected.
    pub include_line_contains: Vec<Regex>,
    /// Lines matching any pattern are removed from the output.
    pub remove_all_lines: Vec<Regex>,
    /// Context lines shown before each matching line.
    pub lines_before: usize,
    /// Context lines shown after each matching line.
    pub lines_after: usize,
    /// `--line-numbers`.
    pub line_numbers: bool,
    /// `--file-instructions` and `--CRITERIA-file-instructions`.
    pub file_instructions: Vec<InstructionBinding>,
    /// `--save-file-output [TEMPLATE]`.
    pub save_file_output: Option<String>,
    /// Options shared by all commands.
    pub shared: SharedOptions,
}

impl FindFilesCommand {
    /// Adds an include glob unless it is already present.
    pub fn add_glob(&mut self, glob: &str) {
        if !self.globs.iter().any(|g| g == glob) {
            self.globs.push(glob.to_string());
        }
    }

    /// Whether any line-level option is set, which routes file content through the
    /// line-window formatter instead of emitting it whole.
    pub fn has_line_filters(&self) -> bool {
        !self.include_line_contains.is_empty()
            || !self.remove_all_lines.is_empty()
            || self.line_numbers
            || self.lines_before > 0
            || self.lines_after > 0
    }

    fn is_empty(&self) -> bool {
        self.globs.is_empty()
            && self.exclude_globs.is_empty()
            && self.exclude_file_name_patterns.is_empty()
            && self.include_file_contains.is_empty()
            && self.exclude_file_contains.is_empty()
            && !self.has_line_filters()
            && self.file_instructions.is_empty()
            && self.save_file_output.is_none()
    }
}

// --- WEB ---

/// The search engine a web search is sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchEngine {
    /// `--google`.
    Google,
    /// `--bing` (default).
    #[default]
    Bing,
    /// `--duckduckgo`.
    DuckDuckGo,
    /// `--yahoo`.
    Yahoo,
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::DuckDuckGo => "duckduckgo",
            Self::Yahoo => "yahoo",
        };
        f.write_str(name)
    }
}

/// Options controlling how fetched pages are processed.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// `--strip`: strip HTML down to text.
    pub strip_html: bool,
    /// `--interactive`: show the browser.
    pub interactive: bool,
    /// `--save-page-folder DIR`.
    pub save_page_folder: Option<String>,
    /// `--save-page-output [TEMPLATE]`.
    pub save_page_output: Option<String>,
    /// `--page-instructions` and `--CRITERIA-page-instructions`.
    pub page_instructions: Vec<InstructionBinding>,
}

/// `web search TERMS...`
#[derive(Debug, Clone)]
pub struct WebSearchCommand {
    /// Search terms.
    pub terms: Vec<String>,
    /// The engine to query.
    pub engine: SearchEngine,
    /// Maximum number of results.
    pub max_results: usize,
    /// `--get`: also fetch every result page.
    pub get_pages: bool,
    /// Page processing options.
    pub page: PageOptions,
    /// Options shared by all commands.
    pub shared: SharedOptions,
}

impl Default for WebSearchCommand {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            engine: SearchEngine::default(),
            max_results: DEFAULT_MAX_SEARCH_RESULTS,
            get_pages: false,
            page: PageOptions::default(),
            shared: SharedOptions::default(),
        }
    }
}

/// `web get URLS...`
#[derive(Debug, Clone, Default)]
pub struct WebGetCommand {
    /// The pages to fetch.
    pub urls: Vec<String>,
    /// Page processing options.
    pub page: PageOptions,
    /// Options shared by all commands.
    pub shared: SharedOptions,
}

// --- RUN ---

/// The shell a `run` script is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptShell {
    /// `sh -c` (Unix default).
    Sh,
    /// `--bash`.
    Bash,
    /// `--cmd` (Windows default).
    Cmd,
    /// `--powershell`.
    PowerShell,
}

impl Default for ScriptShell {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Self::Cmd
        } else {
            Self::Sh
        }
    }
}

/// `run SCRIPT...`
#[derive(Debug, Clone, Default)]
pub struct RunCommand {
    /// The script body; every positional token is one line.
    pub script: String,
    /// The shell to run it with.
    pub shell: ScriptShell,
    /// Options shared by all commands.
    pub shared: SharedOptions,
}

impl RunCommand {
    /// Appends a line to the script body.
    pub fn append_line(&mut self, line: &str) {
        if !self.script.is_empty() {
            self.script.push('\n');
        }
        self.script.push_str(line);
    }
}

// --- EXPORT / HELP / VERSION ---

/// `export INPUTS... --output FILE`
#[derive(Debug, Clone, Default)]
pub struct ExportCommand {
    /// Markdown files to export.
    pub inputs: Vec<String>,
    /// `--output FILE`.
    pub output: Option<String>,
    /// `--format NAME`; defaults to the output file's extension.
    pub format: Option<String>,
    /// Options shared by all commands.
    pub shared: SharedOptions,
}

/// `help [TOPIC...]`
#[derive(Debug, Clone, Default)]
pub struct HelpCommand {
    /// The topic path, one word per element.
    pub topic: Vec<String>,
    /// Options shared by all commands.
    pub shared: SharedOptions,
}

/// `version`
#[derive(Debug, Clone, Default)]
pub struct VersionCommand {
    /// Options shared by all commands.
    pub shared: SharedOptions,
}

// --- THE COMMAND SUM TYPE ---

/// One parsed command.
#[derive(Debug, Clone)]
pub enum Command {
    /// The default command.
    FindFiles(FindFilesCommand),
    /// `web search`.
    WebSearch(WebSearchCommand),
    /// `web get`.
    WebGet(WebGetCommand),
    /// `run`.
    Run(RunCommand),
    /// `help`.
    Help(HelpCommand),
    /// `version`.
    Version(VersionCommand),
    /// `export`.
    Export(ExportCommand),
}

impl Command {
    /// The user-facing name, also used as the help topic.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FindFiles(_) => "find",
            Self::WebSearch(_) => "web search",
            Self::WebGet(_) => "web get",
            Self::Run(_) => "run",
            Self::Help(_) => "help",
            Self::Version(_) => "version",
            Self::Export(_) => "export",
        }
    }

    /// Options shared by all commands.
    pub fn shared(&self) -> &SharedOptions {
        match self {
            Self::FindFiles(c) => &c.shared,
            Self::WebSearch(c) => &c.shared,
            Self::WebGet(c) => &c.shared,
            Self::Run(c) => &c.shared,
            Self::Help(c) => &c.shared,
            Self::Version(c) => &c.shared,
            Self::Export(c) => &c.shared,
        }
    }

    /// Mutable access to the shared options.
    pub fn shared_mut(&mut self) -> &mut SharedOptions {
        match self {
            Self::FindFiles(c) => &mut c.shared,
            Self::WebSearch(c) => &mut c.shared,
            Self::WebGet(c) => &mut c.shared,
            Self::Run(c) => &mut c.shared,
            Self::Help(c) => &mut c.shared,
            Self::Version(c) => &mut c.shared,
            Self::Export(c) => &mut c.shared,
        }
    }

    /// Whether nothing discriminating has been set yet. Empty commands are dropped when
    /// closed.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::FindFiles(c) => c.is_empty(),
            Self::WebSearch(c) => c.terms.is_empty(),
            Self::WebGet(c) => c.urls.is_empty(),
            Self::Run(c) => c.script.trim().is_empty(),
            Self::Export(c) => c.inputs.is_empty(),
            Self::Help(_) | Self::Version(_) => false,
        }
    }

    /// Finalizes a non-empty command at a command boundary, applying defaults and
    /// checking required options.
    pub fn validate(self) -> Result<Self, ParseError> {
        match self {
            Self::FindFiles(mut c) => {
                if c.globs.is_empty() {
                    c.globs.push("**".to_string());
                }
                Ok(Self::FindFiles(c))
            }
            Self::Export(c) => {
                if c.output.is_none() {
                    return Err(ParseError::MissingValue {
                        option: "--output".to_string(),
                        expected: "output file",
                        command: "export".to_string(),
                    });
                }
                Ok(Self::Export(c))
            }
            other @ (Self::WebSearch(_)
            | Self::WebGet(_)
            | Self::Run(_)
            | Self::Help(_)
            | Self::Version(_)) => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_criteria_matches_suffix_case_insensitively() {
        let ext = InstructionBinding::new("summarize", "cs");
        assert!(ext.applies_to("src/Program.CS"));
        assert!(!ext.applies_to("src/main.rs"));

        let everything = InstructionBinding::new("summarize", "");
        assert!(everything.applies_to("anything.txt"));
    }

    #[test]
    fn test_instructions_for_keeps_declaration_order() {
        let bindings = vec![
            InstructionBinding::new("first", ""),
            InstructionBinding::new("only rust", "rs"),
            InstructionBinding::new("last", ""),
        ];
        assert_eq!(
            instructions_for(&bindings, "lib.rs"),
            vec!["first", "only rust", "last"]
        );
        assert_eq!(instructions_for(&bindings, "lib.py"), vec!["first", "last"]);
    }

    #[test]
    fn test_empty_find_files_gets_default_glob_on_validate() {
        let cmd = Command::FindFiles(FindFilesCommand {
            line_numbers: true,
            ..Default::default()
        });
        assert!(!cmd.is_empty());
        match cmd.validate().unwrap() {
            Command::FindFiles(f) => assert_eq!(f.globs, vec!["**"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_emptiness_per_kind() {
        assert!(Command::FindFiles(FindFilesCommand::default()).is_empty());
        assert!(Command::WebSearch(WebSearchCommand::default()).is_empty());
        assert!(Command::WebGet(WebGetCommand::default()).is_empty());
        assert!(Command::Run(RunCommand::default()).is_empty());
        assert!(Command::Export(ExportCommand::default()).is_empty());
        assert!(!Command::Help(HelpCommand::default()).is_empty());
        assert!(!Command::Version(VersionCommand::default()).is_empty());
    }

    #[test]
    fn test_export_requires_output() {
        let cmd = Command::Export(ExportCommand {
            inputs: vec!["a.md".to_string()],
            ..Default::default()
        });
        let err = cmd.validate().unwrap_err();
        assert!(err.to_string().contains("--output"));
    }

    #[test]
    fn test_run_append_line_joins_with_newlines() {
        let mut run = RunCommand::default();
        run.append_line("echo one");
        run.append_line("echo two");
        assert_eq!(run.script, "echo one\necho two");
    }
}
