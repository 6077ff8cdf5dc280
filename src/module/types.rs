//! Core module types
//!
//! Defines the data parsed from the module command's terse listings:
//! - `Module` represents one available module designation
//! - `AvailableModules` is the ordered name → module mapping

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;

/// Symbol the module command attaches to the default version of a module
pub const DEFAULT_SYMBOL: &str = "default";

/// A module file reported by the module command
///
/// Human-readable texts (whatis, help, display) are fetched lazily through
/// the client the first time they are asked for and kept for the lifetime
/// of this instance. See [`Module::desc`], [`Module::help`] and
/// [`Module::display`].
#[derive(Debug, Serialize)]
pub struct Module {
    /// Full designation, such as `foo/1.0`
    pub name: String,
    /// Symbols attached to the designation, in listing order
    pub symbols: Vec<String>,
    #[serde(skip)]
    pub(crate) whatis: OnceCell<String>,
    #[serde(skip)]
    pub(crate) help_message: OnceCell<String>,
    #[serde(skip)]
    pub(crate) display_message: OnceCell<String>,
}

impl Module {
    /// Create a module with the given designation and symbols
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            symbols,
            whatis: OnceCell::new(),
            help_message: OnceCell::new(),
            display_message: OnceCell::new(),
        }
    }

    /// Parse one line of `avail --terse --output=sym` output
    ///
    /// Returns `None` for blank lines and modulepath header lines (those
    /// ending with `:`). A line without a trailing parenthesized group is a
    /// module without symbols.
    pub fn from_terse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.ends_with(':') {
            return None;
        }

        if let Some(inner) = line.strip_suffix(')') {
            if let Some((name, syms)) = inner.rsplit_once('(') {
                if !name.is_empty() {
                    let symbols = syms
                        .split(':')
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect();
                    return Some(Self::new(name, symbols));
                }
            }
        }

        Some(Self::new(line, Vec::new()))
    }

    /// Module name without its version part (`foo` for `foo/1.0`)
    pub fn family(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map(|(family, _)| family)
            .unwrap_or(&self.name)
    }

    /// Version part of the designation (`1.0` for `foo/1.0`)
    pub fn version(&self) -> Option<&str> {
        self.name.rsplit_once('/').map(|(_, version)| version)
    }

    /// Symbolic versions, i.e. every symbol except the default marker
    pub fn versions(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .map(String::as_str)
            .filter(|s| *s != DEFAULT_SYMBOL)
            .collect()
    }

    /// Whether the module command marks this designation as the default
    pub fn is_default(&self) -> bool {
        self.symbols.iter().any(|s| s == DEFAULT_SYMBOL)
    }

    /// Version to show for a default-marked designation
    ///
    /// The first symbolic version when there is one, otherwise the version
    /// part of the designation. `None` when the default marker is absent.
    pub fn default_version(&self) -> Option<&str> {
        if !self.is_default() {
            return None;
        }
        self.versions().first().copied().or_else(|| self.version())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Modules reported available, in the order the module command listed them
#[derive(Debug, Default)]
pub struct AvailableModules {
    modules: Vec<Arc<Module>>,
    index: HashMap<String, usize>,
}

impl AvailableModules {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mapping from a full terse listing
    pub fn from_terse(listing: &str) -> Self {
        let mut available = Self::new();
        for module in listing.lines().filter_map(Module::from_terse_line) {
            available.insert(module);
        }
        available
    }

    /// Insert a module; a repeated name keeps its position but takes the new value
    pub fn insert(&mut self, module: Module) {
        let module = Arc::new(module);
        match self.index.get(&module.name) {
            Some(&pos) => self.modules[pos] = module,
            None => {
                self.index.insert(module.name.clone(), self.modules.len());
                self.modules.push(module);
            }
        }
    }

    /// Look up a module by designation
    pub fn get(&self, name: &str) -> Option<&Arc<Module>> {
        self.index.get(name).map(|&pos| &self.modules[pos])
    }

    /// Check whether a designation is available
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate over modules in listing order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.iter()
    }

    /// Designations in listing order
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    /// Number of available modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no module is available
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
