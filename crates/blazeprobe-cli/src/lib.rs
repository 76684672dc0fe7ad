//! Blazeprobe CLI library
//!
//! Argument parsing, logging setup, progress output and the subcommand
//! runners behind the `blazeprobe` binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
pub mod runner;

pub use commands::{BrowserArg, Cli, ColorArg, Commands, ConfigArgs, ConfigSource, ListArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
