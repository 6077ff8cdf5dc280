//! Module command integration
//!
//! Talks to the external `modulecmd` program:
//! - `locate_modulecmd` - Finds and validates the executable
//! - `ProcessRunner` - Async subprocess execution with timeout
//! - `Modulecmd` - Client session with listing caches
//! - `ShellEnv` / `Statement` - Environment view and the changes applied to it

mod client;
mod env;
mod locate;
mod runner;
mod shellcode;

#[cfg(test)]
pub(crate) mod testing;

pub use client::*;
pub use env::*;
pub use locate::*;
pub use runner::*;
pub use shellcode::*;
