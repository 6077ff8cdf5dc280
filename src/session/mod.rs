//! Session module
//!
//! Collapses the interactive front-end into one view-model:
//! - `EnvironmentView` - Snapshot of available, loaded, used and saved items
//! - `Action` - User intents turned into module commands
//! - `Session` - Applies actions and refreshes the view

mod manager;
mod types;

pub use manager::*;
pub use types::*;
