//! Client-side environment view
//!
//! The module command reads its state (loaded modules, modulepaths, ...) from
//! environment variables and answers with changes to apply to them. `ShellEnv`
//! holds the variables the client passes to every run and receives those
//! changes, so the process environment itself is never mutated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Statement;

/// Separator of path-like variables
pub const PATH_SEPARATOR: char = ':';

/// Environment variables and working directory seen by the module command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellEnv {
    vars: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ShellEnv {
    /// Snapshot the current process environment
    ///
    /// Variables whose name or value is not valid unicode are left out.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars, cwd: None }
    }

    /// Build an environment from explicit variables
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            cwd: None,
        }
    }

    /// Get a variable value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Define or redefine a variable
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Remove a variable
    pub fn unset(&mut self, name: &str) {
        self.vars.remove(name);
    }

    /// All variables, sorted by name
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Working directory requested by the module command, if any
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Split a path-like variable into its elements
    ///
    /// Returns an empty list when the variable is unset or empty.
    pub fn path_list(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(value) if !value.is_empty() => {
                value.split(PATH_SEPARATOR).map(String::from).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Apply parsed environment changes and return the reported status
    ///
    /// The status defaults to `true` when the code does not carry one.
    pub fn apply(&mut self, statements: &[Statement]) -> bool {
        let mut status = true;
        for statement in statements {
            match statement {
                Statement::Import => {}
                Statement::SetVar { name, value } => {
                    debug!("set {}={}", name, value);
                    self.set(name.clone(), value.clone());
                }
                Statement::UnsetVar { name } => {
                    debug!("unset {}", name);
                    self.unset(name);
                }
                Statement::Chdir(path) => {
                    debug!("chdir {}", path);
                    self.cwd = Some(PathBuf::from(path));
                }
                Statement::Status(value) => status = *value,
                Statement::Echo(text) => eprintln!("{}", text),
            }
        }
        status
    }
}
