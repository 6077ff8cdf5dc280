//! Environment change code parser
//!
//! The module command renders environment changes as python statements when
//! asked for the `python` output shell. Rather than executing that code, the
//! client recognizes the handful of statement shapes the command emits and
//! turns them into [`Statement`] values:
//!
//! ```text
//! import os
//! os.environ['LOADEDMODULES'] = 'foo/1.0'
//! del os.environ['FOO_HOME']
//! os.chdir('/tmp')
//! _mlstatus = True
//! ```
//!
//! Anything else is reported and skipped; it is never evaluated.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::ParseError;

/// Quoted python string literal (single or double quotes, backslash escapes)
const LITERAL: &str = r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#;

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^import\s+[\w.]+(?:\s*,\s*[\w.]+)*$").unwrap());

static SET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^os\.environ\[\s*(?P<name>{LITERAL})\s*\]\s*=\s*(?P<value>{LITERAL})$"
    ))
    .unwrap()
});

static UNSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^del\s+os\.environ\[\s*(?P<name>{LITERAL})\s*\]$")).unwrap()
});

static CHDIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^os\.chdir\(\s*(?P<path>{LITERAL})\s*\)$")).unwrap());

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_mlstatus\s*=\s*(?P<status>True|False)$").unwrap());

static PRINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^print\(\s*(?P<text>{LITERAL})\s*\)$")).unwrap());

/// One environment change emitted by the module command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `import ...`, no effect
    Import,
    /// Define or redefine a variable
    SetVar { name: String, value: String },
    /// Remove a variable
    UnsetVar { name: String },
    /// Change working directory
    Chdir(String),
    /// Status of the module command run
    Status(bool),
    /// Message meant for the user
    Echo(String),
}

/// Parse one line of python code
///
/// Blank lines and comments yield `Ok(None)`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Statement>, ParseError> {
    let line = line.trim().trim_end_matches(';').trim_end();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if IMPORT_RE.is_match(line) {
        return Ok(Some(Statement::Import));
    }
    if let Some(caps) = SET_RE.captures(line) {
        return Ok(Some(Statement::SetVar {
            name: decode_literal(&caps["name"])?,
            value: decode_literal(&caps["value"])?,
        }));
    }
    if let Some(caps) = UNSET_RE.captures(line) {
        return Ok(Some(Statement::UnsetVar {
            name: decode_literal(&caps["name"])?,
        }));
    }
    if let Some(caps) = CHDIR_RE.captures(line) {
        return Ok(Some(Statement::Chdir(decode_literal(&caps["path"])?)));
    }
    if let Some(caps) = STATUS_RE.captures(line) {
        return Ok(Some(Statement::Status(&caps["status"] == "True")));
    }
    if let Some(caps) = PRINT_RE.captures(line) {
        return Ok(Some(Statement::Echo(decode_literal(&caps["text"])?)));
    }

    Err(ParseError::UnrecognizedStatement {
        line: line_no,
        content: line.to_string(),
    })
}

/// Parse a whole block of python code, skipping statements it cannot read
pub fn parse_python(content: &str) -> Vec<Statement> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match parse_line(idx + 1, line) {
            Ok(statement) => statement,
            Err(e) => {
                warn!("Skipping environment change: {}", e);
                None
            }
        })
        .collect()
}

/// Decode a quoted python string literal
fn decode_literal(literal: &str) -> Result<String, ParseError> {
    let malformed = || ParseError::MalformedLiteral(literal.to_string());

    let quote = literal.chars().next().ok_or_else(malformed)?;
    if literal.len() < 2 || !matches!(quote, '\'' | '"') || !literal.ends_with(quote) {
        return Err(malformed());
    }
    let inner = &literal[1..literal.len() - 1];

    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => decoded.push('\\'),
            Some('\'') => decoded.push('\''),
            Some('"') => decoded.push('"'),
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            // python keeps unknown escapes verbatim
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => return Err(malformed()),
        }
    }
    Ok(decoded)
}
