//! Session view-model types
//!
//! - `EnvironmentView` is the snapshot every listing is rendered from
//! - `Action` is one user intent, turned into a module command
//! - `LoadedChanges` / `ActionOutcome` report what an action did

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::module::AvailableModules;
use crate::modulecmd::Modulecmd;

/// Entry of the loaded modules list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedEntry {
    /// Designation as recorded in the loaded modules variable
    pub name: String,
    /// Whether the designation is part of the availability listing
    pub available: bool,
}

/// Row of the available modules listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableRow {
    pub name: String,
    pub symbols: Vec<String>,
    pub loaded: bool,
}

/// Snapshot of the module environment
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvironmentView {
    /// Available modules, shared with the client cache
    #[serde(skip)]
    pub available: Arc<AvailableModules>,
    /// Loaded modules in load order
    pub loaded: Vec<LoadedEntry>,
    /// Enabled modulepaths
    pub used: Vec<String>,
    /// Saved collections
    pub saved: Vec<String>,
}

impl EnvironmentView {
    /// Fetch a fresh snapshot from the module command
    pub async fn fetch(modulecmd: &mut Modulecmd) -> Self {
        let available = modulecmd.avail(true).await;
        let used = modulecmd.used();
        let saved = modulecmd.saved(true).await;

        // loaded modules may not be part of available modules
        let loaded = modulecmd
            .loaded()
            .into_iter()
            .map(|name| LoadedEntry {
                available: available.contains(&name),
                name,
            })
            .collect();

        Self {
            available,
            loaded,
            used,
            saved,
        }
    }

    /// Whether a designation is currently loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.iter().any(|entry| entry.name == name)
    }

    /// Available modules with their loaded state
    pub fn available_rows(&self) -> Vec<AvailableRow> {
        self.available
            .iter()
            .map(|module| AvailableRow {
                name: module.name.clone(),
                symbols: module.symbols.clone(),
                loaded: self.is_loaded(&module.name),
            })
            .collect()
    }
}

/// User intent mutating the module environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load a module
    Load(String),
    /// Unload a module
    Unload(String),
    /// Enable a modulepath
    Use(String),
    /// Disable a modulepath
    Unuse(String),
    /// Unload every loaded module
    Purge,
    /// Restore the initial environment
    Reset,
    /// Load the environment recorded in a collection
    Restore(String),
    /// Record the loaded environment in a collection
    Save(String),
}

impl Action {
    /// Module command and arguments implementing this action
    pub fn command(&self) -> Vec<&str> {
        match self {
            Self::Load(module) => vec!["load", module.as_str()],
            Self::Unload(module) => vec!["unload", module.as_str()],
            Self::Use(path) => vec!["use", path.as_str()],
            Self::Unuse(path) => vec!["unuse", path.as_str()],
            Self::Purge => vec!["purge"],
            Self::Reset => vec!["reset"],
            Self::Restore(collection) => vec!["restore", collection.as_str()],
            Self::Save(collection) => vec!["save", collection.as_str()],
        }
    }

    /// Whether the action changes the environment of the calling shell
    pub fn changes_environment(&self) -> bool {
        !matches!(self, Self::Save(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(module) => write!(f, "Module '{}' selected", module),
            Self::Unload(module) => write!(f, "Module '{}' deselected", module),
            Self::Use(path) => write!(f, "Modulepath '{}' used", path),
            Self::Unuse(path) => write!(f, "Modulepath '{}' unused", path),
            Self::Purge => write!(f, "Loaded modules purged"),
            Self::Reset => write!(f, "Initial environment restored"),
            Self::Restore(collection) => write!(f, "Collection '{}' restored", collection),
            Self::Save(collection) => write!(f, "Collection '{}' saved", collection),
        }
    }
}

/// Modules unloaded and loaded by an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadedChanges {
    /// Unloaded modules, most recently loaded first
    pub unloaded: Vec<String>,
    /// Newly loaded modules, in load order
    pub loaded: Vec<String>,
}

impl LoadedChanges {
    /// Reconcile loaded lists taken before and after an action
    pub fn between(before: &[String], after: &[String]) -> Self {
        let unloaded = before
            .iter()
            .rev()
            .filter(|module| !after.contains(*module))
            .cloned()
            .collect();
        let loaded = after
            .iter()
            .filter(|module| !before.contains(*module))
            .cloned()
            .collect();
        Self { unloaded, loaded }
    }

    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.unloaded.is_empty() && self.loaded.is_empty()
    }

    /// One event line per change
    pub fn messages(&self) -> Vec<String> {
        self.unloaded
            .iter()
            .map(|m| format!("'{}' unloaded", m))
            .chain(self.loaded.iter().map(|m| format!("'{}' loaded", m)))
            .collect()
    }
}

/// Result of applying an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Status reported by the module command
    pub status: bool,
    /// Code for the calling shell, when one was requested
    pub shell_code: Option<String>,
    /// Loaded module changes
    pub changes: LoadedChanges,
}
