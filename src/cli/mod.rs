//! The command-line surface: argument capture, help markup and command dispatch.

use clap::Parser;

/// Runs parsed commands in order on a shared thread pool.
pub mod dispatcher;
/// One handler per command kind.
pub mod handlers;

/// Renders the semantic help markup (`<title>`, `<hl>`, `<cmd>`, ...) as ANSI styles, or
/// strips the tags when colors are off.
pub fn render_markup(template: &str, use_colors: bool) -> String {
    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let group = if use_colors { "\x1b[1;32m" } else { "" }; // Bold Green
    let err = if use_colors { "\x1b[91m" } else { "" }; // Bright Red
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<err>", err)
        .replace("</err>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset)
}

/// Whether terminal output should be colored.
pub fn should_colorize() -> bool {
    colored::control::SHOULD_COLORIZE.should_colorize()
}

/// mdweave: weave files, web pages and script output into a single Markdown stream.
#[derive(Parser, Debug)]
#[command(author, version, about)]
// Help, version and every option are handled by the command grammar, not by clap.
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The raw token stream, passed to the expander untouched.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
