//! Tooling Layer
//!
//! Command-line entry points and result formatting over the library services.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, ComponentCommands};
pub use format::OutputFormat;
