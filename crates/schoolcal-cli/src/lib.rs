//! Command-line front end for the schoolcal engine
//!
//! Reads event collections from JSON files, runs them through
//! `schoolcal-core` and prints the results as JSON.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
