//! Lazily fetched module texts
//!
//! whatis, help and display messages are extracted from the module command
//! output once per `Module` and kept with it.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::Module;
use crate::modulecmd::Modulecmd;

static HELP_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Module Specific Help for .*:").unwrap());

static HELP_MISSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"WARNING: Unable to find ModulesHelp in .*\.").unwrap());

/// Drop the first `head` and last `tail` lines of a command output
///
/// Lines are split on `\n` exactly, so a trailing newline counts as a final
/// empty line. Yields an empty string when fewer lines remain.
pub fn strip_lines(content: &str, head: usize, tail: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let end = lines.len().saturating_sub(tail);
    if head >= end {
        return String::new();
    }
    lines[head..end].join("\n")
}

/// Extract the whatis text: what follows the first `:` of the first line having one
fn extract_whatis(content: &str) -> Option<String> {
    let (_, text) = content.lines().find_map(|line| line.split_once(':'))?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Remove the framing the module command puts around help text
fn extract_help(content: &str) -> String {
    let text = HELP_HEADER_RE.replace_all(content, "");
    let text = HELP_MISSING_RE.replace_all(&text, "");
    text.trim_matches(|c| matches!(c, '-' | '\n' | ' ')).to_string()
}

impl Module {
    /// Short description from the module's whatis lines
    ///
    /// Falls back to the module name when no description is available.
    pub async fn desc(&self, modulecmd: &Modulecmd) -> &str {
        self.whatis
            .get_or_init(|| async move {
                let out = modulecmd.run(&["whatis", self.name.as_str()]).await;
                extract_whatis(&out).unwrap_or_else(|| {
                    debug!("No description available for {}", self.name);
                    self.name.clone()
                })
            })
            .await
    }

    /// Help message of the module
    pub async fn help(&self, modulecmd: &Modulecmd) -> &str {
        self.help_message
            .get_or_init(|| async move {
                let out = modulecmd.run(&["help", self.name.as_str()]).await;
                let help = extract_help(&out);
                if help.is_empty() {
                    format!("No help for {}", self.name)
                } else {
                    help
                }
            })
            .await
    }

    /// Environment changes the module would make, as reported by `display`
    pub async fn display(&self, modulecmd: &Modulecmd) -> &str {
        self.display_message
            .get_or_init(|| async move {
                let out = modulecmd.run(&["display", self.name.as_str()]).await;
                strip_lines(&out, 2, 2)
            })
            .await
    }
}
