//! MoGui - Front-end for Environment Modules
//!
//! This crate wraps the external `modulecmd` program: it lists available
//! modules, loads and unloads them, manages modulepaths and saved
//! collections, and reports the environment changes those actions make.
//!
//! # Modules
//!
//! - [`modulecmd`] - Module command discovery, process runner and client
//! - [`module`] - Module model and memoized whatis/help/display texts
//! - [`session`] - View-model and actions
//! - [`shell`] - Target shells and shell initialization code
//! - [`config`] - Configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod module;
pub mod modulecmd;
pub mod session;
pub mod shell;

pub use config::Config;
pub use error::{Error, Result};
pub use module::{AvailableModules, Module};
pub use modulecmd::{Modulecmd, ShellEnv};
pub use session::{Action, ActionOutcome, EnvironmentView, LoadedChanges, Session};
pub use shell::Shell;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "mogui-cmd";
