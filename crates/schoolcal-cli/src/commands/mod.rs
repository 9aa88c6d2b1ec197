//! Subcommand implementations.

pub mod config;
pub mod events;

use std::io::Write;

use serde::Serialize;

use crate::error::CliResult;

/// Writes `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").map_err(|e| crate::error::CliError::io("<stdout>", e))?;
    Ok(())
}
