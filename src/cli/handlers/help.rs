// src/cli/handlers/help.rs

use crate::{cli::render_markup, core::grammar::USAGE_TOPIC, models::HelpCommand};
use anyhow::Result;

/// Every help topic, in the order they are listed.
pub const TOPICS: &[&str] = &[
    USAGE_TOPIC,
    "find",
    "web search",
    "web get",
    "run",
    "export",
    "aliases",
    "help",
    "version",
];

/// The help markup for `topic`, or `None` for an unknown topic.
pub fn topic_text(topic: &str) -> Option<&'static str> {
    let text = match topic.trim().to_lowercase().as_str() {
        "" | USAGE_TOPIC => t!("help.topic.usage"),
        "find" => t!("help.topic.find"),
        "web" | "web search" => t!("help.topic.web_search"),
        "web get" => t!("help.topic.web_get"),
        "run" => t!("help.topic.run"),
        "export" => t!("help.topic.export"),
        "aliases" | "alias" => t!("help.topic.aliases"),
        "help" => t!("help.topic.help"),
        "version" => t!("help.topic.version"),
        _ => return None,
    };
    Some(text)
}

/// Renders the help for `topic`; unknown topics list the known ones.
pub fn render_help(topic: &str, use_colors: bool) -> String {
    match topic_text(topic) {
        Some(text) => render_markup(text, use_colors),
        None => format!(
            t!("help.error.unknown_topic"),
            topic = topic,
            topics = TOPICS.join(", ")
        ),
    }
}

/// Runs a `help` command. The output is part of the Markdown stream, so it is uncolored.
pub fn handle(cmd: &HelpCommand) -> Result<String> {
    Ok(render_help(&cmd.topic.join(" "), false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_topic_has_text() {
        for topic in TOPICS {
            assert!(topic_text(topic).is_some(), "missing help for '{}'", topic);
        }
    }

    #[test]
    fn test_unknown_topic_lists_topics() {
        let out = render_help("nonsense", false);
        assert!(out.contains("nonsense"));
        assert!(out.contains("web search"));
    }

    #[test]
    fn test_help_command_joins_topic_words() {
        let cmd = HelpCommand {
            topic: vec!["web".to_string(), "get".to_string()],
            ..Default::default()
        };
        let out = handle(&cmd).unwrap();
        assert_eq!(out, render_markup(t!("help.topic.web_get"), false));
        assert!(!out.contains("<cmd>"));
    }
}
