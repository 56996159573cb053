//! Dutywise CLI library.
//!
//! This library provides the core functionality for the `dutywise` command-line
//! interface: argument parsing, configuration management, command execution
//! and output formatting. Lookups open the reference database read-only;
//! `import` is the only command that writes to it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
