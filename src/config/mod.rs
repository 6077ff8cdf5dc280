//! Configuration module
//!
//! Handles user configuration (`~/.config/mogui/config.toml` on Linux),
//! layered under `MOGUI_` environment variables.

mod settings;

pub use settings::*;
