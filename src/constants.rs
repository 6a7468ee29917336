// src/constants.rs

//! Conventional file and directory names.

/// The name of the per-project directory holding mdweave files (aliases live inside it).
pub const MDWEAVE_DIR: &str = ".mdweave";

/// The name of the alias sub-directory, both under [`MDWEAVE_DIR`] and under the user
/// configuration directory.
pub const ALIASES_DIR: &str = "aliases";

/// The extension (without dot) of an alias file.
pub const ALIAS_FILE_EXTENSION: &str = "alias";

/// The default options file, prepended to every non-empty invocation when present.
pub const DEFAULT_OPTIONS_FILENAME: &str = "mdweave.defaults";

/// The ignore file searched for in the working directory and its ancestors.
pub const IGNORE_FILENAME: &str = ".mdweaveignore";

/// The name of the application directory inside the user configuration directory.
pub const APP_CONFIG_DIRNAME: &str = "mdweave";

/// The token that closes the current command.
pub const COMMAND_SEPARATOR: &str = "--";

/// The no-op token used to glue together tokens from different expansion sources.
pub const AND_SEPARATOR: &str = "--and";

/// Template used by `--save-output` when no template is given.
pub const DEFAULT_SAVE_OUTPUT_TEMPLATE: &str = "output.md";

/// Template used by `--save-file-output` when no template is given.
pub const DEFAULT_SAVE_FILE_OUTPUT_TEMPLATE: &str = "{filePath}/{fileBase}-output.md";

/// Template used by `--save-page-output` when no template is given.
pub const DEFAULT_SAVE_PAGE_OUTPUT_TEMPLATE: &str = "{filePath}/{fileBase}-output.md";

/// Environment variable naming the program that applies instructions to content.
pub const INSTRUCTIONS_CMD_ENV: &str = "MDWEAVE_INSTRUCTIONS_CMD";

/// Number of results a web search returns unless `--max` says otherwise.
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 10;
