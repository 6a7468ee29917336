// src/state.rs

//! The explicit run context.
//!
//! Everything that would otherwise be process-wide state (verbosity flags, the working
//! directory, the alias search path and the buffered standard input) lives in an
//! [`AppContext`] created once at startup and passed to every component that needs it.

use crate::constants::{ALIASES_DIR, APP_CONFIG_DIRNAME, MDWEAVE_DIR};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Output verbosity flags. Set once at startup, read-only afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalFlags {
    /// `--debug`: debug-level logging.
    pub debug: bool,
    /// `--verbose`: info-level logging.
    pub verbose: bool,
    /// `--quiet`: do not echo command output to stdout.
    pub quiet: bool,
}

impl GlobalFlags {
    /// Scans a raw argument vector for the verbosity flags.
    ///
    /// Runs on the raw arguments and again on the expanded tokens, so flags read from
    /// `@@` files and the defaults file are seen before parsing.
    pub fn scan(args: &[String]) -> Self {
        let has = |flag: &str| args.iter().any(|a| a == flag);
        Self {
            debug: has("--debug"),
            verbose: has("--verbose"),
            quiet: has("--quiet"),
        }
    }

    /// The log level these flags select.
    pub fn log_level(self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else if self.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        }
    }

    /// Combines two flag sets; a flag set in either is set in the result.
    pub fn merge(self, other: Self) -> Self {
        Self {
            debug: self.debug || other.debug,
            verbose: self.verbose || other.verbose,
            quiet: self.quiet || other.quiet,
        }
    }
}

/// A read-once cache of the lines available on standard input.
///
/// The first `@-`/`@@-` reference reads stdin to the end; every later reference in the
/// same run reuses the buffered lines instead of blocking again.
#[derive(Debug, Default)]
pub struct StdinCache {
    lines: OnceLock<Vec<String>>,
}

impl StdinCache {
    /// Creates a cache that will read the process's standard input on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache pre-populated with `lines`. Standard input is never touched.
    pub fn preloaded(lines: Vec<String>) -> Self {
        let cache = Self::default();
        // A fresh OnceLock is always empty, so `set` cannot fail here.
        let _ = cache.lines.set(lines);
        cache
    }

    /// Returns the buffered lines, reading standard input the first time.
    pub fn lines(&self) -> &[String] {
        self.lines.get_or_init(|| {
            log::debug!("Reading standard input into the stdin cache.");
            io::stdin().lock().lines().map_while(Result::ok).collect()
        })
    }

    /// Returns the buffered input as a single text block.
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

/// The context shared by the expander, the grammar and the command handlers.
#[derive(Debug)]
pub struct AppContext {
    /// The directory relative paths, globs and conventional files are resolved against.
    pub working_dir: PathBuf,
    /// Directories searched, in order, for `NAME.alias` files.
    pub alias_dirs: Vec<PathBuf>,
    /// Verbosity flags.
    pub flags: GlobalFlags,
    /// Buffered standard input.
    pub stdin: StdinCache,
}

impl AppContext {
    /// Builds the context for a real run: the current directory, the conventional alias
    /// directories, and a lazily-read stdin.
    pub fn from_environment(flags: GlobalFlags) -> io::Result<Self> {
        let working_dir = std::env::current_dir()?;
        let mut alias_dirs = vec![local_alias_dir(&working_dir)];
        if let Some(config_dir) = dirs::config_dir() {
            alias_dirs.push(config_dir.join(APP_CONFIG_DIRNAME).join(ALIASES_DIR));
        }
        Ok(Self {
            working_dir,
            alias_dirs,
            flags,
            stdin: StdinCache::new(),
        })
    }

    /// Builds a context rooted at `working_dir` with only the local alias directory and
    /// the given stdin cache. This is what tests use.
    pub fn rooted(working_dir: impl Into<PathBuf>, stdin: StdinCache) -> Self {
        let working_dir = working_dir.into();
        Self {
            alias_dirs: vec![local_alias_dir(&working_dir)],
            working_dir,
            flags: GlobalFlags::default(),
            stdin,
        }
    }

    /// Resolves a user-supplied path against the working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(path)
    }

    /// The directory new aliases are saved to.
    pub fn local_alias_dir(&self) -> PathBuf {
        local_alias_dir(&self.working_dir)
    }
}

fn local_alias_dir(working_dir: &Path) -> PathBuf {
    working_dir.join(MDWEAVE_DIR).join(ALIASES_DIR)
}
