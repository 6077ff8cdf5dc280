//! Module model
//!
//! - `Module` - One designation from the availability listing
//! - `AvailableModules` - Ordered, name-keyed set of modules
//! - whatis/help/display accessors memoized per module

mod info;
mod types;

pub use info::*;
pub use types::*;
