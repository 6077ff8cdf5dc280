//! Error types for mogui
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type for mogui
#[derive(Error, Debug)]
pub enum Error {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Module command error: {0}")]
    Command(#[from] CommandError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while locating and validating the module command
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Environment variable '{0}' not defined")]
    CommandVarUnset(String),

    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error(
        "Environment Modules version {required} or higher is required. Found version {found}"
    )]
    UnsupportedVersion { required: String, found: String },

    #[error("Unable to parse module command version '{0}'")]
    InvalidVersion(String),
}

/// Errors raised while running the module command
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run '{command}': {reason}")]
    SpawnFailed { command: String, reason: String },

    #[error("Module command timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors raised while parsing environment change code
///
/// Parse failures never abort an evaluation: the offending line is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized statement on line {line}: {content}")]
    UnrecognizedStatement { line: usize, content: String },

    #[error("Malformed string literal: {0}")]
    MalformedLiteral(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(PathBuf),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
