//! Command-line runner for the storefront journey suite.
//!
//! Flags override the environment variables [`storefront_probe::SuiteConfig`]
//! reads; everything else comes from the environment or its defaults.

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    AuthArgs, Cli, ColorArg, Commands, ConfigArgs, ListArgs, LogFormatArg, RunArgs, SelectArgs,
    SiteArgs,
};
pub use config::{running_in_ci, CliConfig, ColorChoice, SuiteOverrides, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
