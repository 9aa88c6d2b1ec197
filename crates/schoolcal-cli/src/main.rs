//! schoolcal CLI entry point.

use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use schoolcal_core::{TracingConfig, init_tracing};

use schoolcal_cli::cli::{Cli, Command, ConfigAction};
use schoolcal_cli::commands::{self, events, print_json};
use schoolcal_cli::config::CliConfig;
use schoolcal_cli::error::CliResult;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path),
        None => CliConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let tracing_config = TracingConfig::for_cli(cli.debug || config.debug, config.log_format);
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli.command, &config, &config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &CliConfig, config_path: &Path) -> CliResult<()> {
    let settings = &config.calendar;
    match command {
        Command::Project {
            events,
            view,
            anchor,
            category,
            query,
        } => {
            let rows = events::load_events(&events)?;
            let result = events::project(&rows, &view, anchor, category, query, settings)?;
            print_json(&result)
        }
        Command::Conflicts { events, day } => {
            let rows = events::load_events(&events)?;
            print_json(&events::conflicts(&rows, day, settings))
        }
        Command::Expand {
            template,
            pattern,
            horizon,
        } => {
            let template = events::read_json(&template)?;
            print_json(&events::expand(template, &pattern, horizon, settings)?)
        }
        Command::Upcoming { events, limit } => {
            let rows = events::load_events(&events)?;
            print_json(&events::upcoming(&rows, Utc::now(), limit))
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(config, config_path),
            ConfigAction::Validate => commands::config::validate(config),
            ConfigAction::Path => commands::config::path(config_path),
        },
    }
}
