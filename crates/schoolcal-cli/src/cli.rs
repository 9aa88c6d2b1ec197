//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use schoolcal_core::CategoryFilter;
use schoolcal_core::time::parse_date;

/// schoolcal - School event calendar views, conflicts and recurrences
#[derive(Debug, Parser)]
#[command(name = "schoolcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "SCHOOLCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project events into a calendar view
    Project {
        /// JSON file holding an array of events (`-` for stdin)
        #[arg(long)]
        events: PathBuf,

        /// View mode: month, week, timeline, heatmap, year or grid3d
        #[arg(long, default_value = "month")]
        view: String,

        /// Reference date (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = parse_date)]
        anchor: Option<NaiveDate>,

        /// Category to keep, or "all"
        #[arg(long, default_value = "all")]
        category: CategoryFilter,

        /// Case-insensitive text matched against title, description and location
        #[arg(long, default_value = "")]
        query: String,
    },

    /// List overlapping event pairs on one day
    Conflicts {
        /// JSON file holding an array of events (`-` for stdin)
        #[arg(long)]
        events: PathBuf,

        /// Day to inspect (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        day: NaiveDate,
    },

    /// Expand a recurring event template into instances
    Expand {
        /// JSON file holding the template event (`-` for stdin)
        #[arg(long)]
        template: PathBuf,

        /// Repetition: daily, weekly, biweekly or monthly
        #[arg(long)]
        pattern: String,

        /// Last date that may hold an instance (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        horizon: NaiveDate,
    },

    /// List events that have not started yet
    Upcoming {
        /// JSON file holding an array of events (`-` for stdin)
        #[arg(long)]
        events: PathBuf,

        /// Maximum number of events to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Dump,
    /// Check the configuration for errors
    Validate,
    /// Show the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use schoolcal_core::Category;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_project_defaults() {
        let cli = Cli::try_parse_from(["schoolcal", "project", "--events", "e.json"]).unwrap();
        match cli.command {
            Command::Project {
                view,
                anchor,
                category,
                query,
                ..
            } => {
                assert_eq!(view, "month");
                assert!(anchor.is_none());
                assert_eq!(category, CategoryFilter::All);
                assert!(query.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_project_filters() {
        let cli = Cli::try_parse_from([
            "schoolcal",
            "--debug",
            "project",
            "--events",
            "e.json",
            "--view",
            "week",
            "--anchor",
            "2024-04-20",
            "--category",
            "Sports",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Command::Project { anchor, category, .. } => {
                assert_eq!(anchor, NaiveDate::from_ymd_opt(2024, 4, 20));
                assert_eq!(category, CategoryFilter::Only(Category::Sports));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_category_and_bad_dates() {
        assert!(
            Cli::try_parse_from(["schoolcal", "project", "--events", "e.json", "--category", "chess"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["schoolcal", "conflicts", "--events", "e.json", "--day", "04/20/2024"])
                .is_err()
        );
    }
}
