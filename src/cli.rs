//! Command-line interface parsing for menunav
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated [`Request`] before any configuration is loaded or any network
//! call is made.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::data::{DateKey, SelectionMode};

/// Largest range the `week` command will resolve at once
pub const MAX_DAYS: u32 = 14;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// A date argument was not in `MM/DD/YYYY` form
    #[error("Invalid date: '{0}'. Expected MM/DD/YYYY, e.g. 03/01/2024")]
    InvalidDate(String),

    /// The requested day range is empty or too long
    #[error("Invalid day count: {0}. Expected 1 to {}", MAX_DAYS)]
    InvalidDays(u32),
}

/// menunav - Look up and browse daily dining hall menus
#[derive(Parser, Debug)]
#[command(name = "menunav")]
#[command(about = "Look up and browse daily dining hall menus")]
#[command(version)]
pub struct Cli {
    /// JSON config file (defaults to ./config.json, then environment variables)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for cached menus (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// How to pick the day from upstream data: explicit or implicit
    #[arg(long, global = true, value_name = "MODE")]
    pub mode: Option<SelectionMode>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the meals served on a date
    ///
    /// Examples:
    ///   menunav menu                   # Today's menu
    ///   menunav menu --date 03/01/2024
    Menu {
        /// Date in MM/DD/YYYY form (defaults to today)
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Follow a selection token printed by a previous command
    ///
    /// Examples:
    ///   menunav select 03/01/2024.Lunch
    ///   menunav select 03/01/2024.Lunch.Entrée
    Select {
        /// Token of the form DATE[.MEAL[.COURSE]]
        token: String,
    },
    /// Show the meals for several consecutive days
    Week {
        /// First date in MM/DD/YYYY form (defaults to today)
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
        /// Number of days to show
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

/// A validated request derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Menu(DateKey),
    Select(String),
    Week { start: DateKey, days: u32 },
}

/// Parses a date argument, defaulting to today when absent
///
/// # Arguments
/// * `arg` - The date string from CLI, if any
/// * `today` - The date to use when no argument was given
pub fn parse_date_arg(arg: Option<&str>, today: DateKey) -> Result<DateKey, CliError> {
    match arg {
        None => Ok(today),
        Some(s) => DateKey::parse(s).map_err(|_| CliError::InvalidDate(s.to_string())),
    }
}

impl Request {
    /// Creates a Request from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Request)` with dates resolved against `today`
    /// * `Err(CliError)` if a date or day count is invalid
    pub fn from_cli(cli: &Cli, today: DateKey) -> Result<Self, CliError> {
        match &cli.command {
            Command::Menu { date } => Ok(Request::Menu(parse_date_arg(date.as_deref(), today)?)),
            Command::Select { token } => Ok(Request::Select(token.clone())),
            Command::Week { date, days } => {
                if *days == 0 || *days > MAX_DAYS {
                    return Err(CliError::InvalidDays(*days));
                }
                Ok(Request::Week {
                    start: parse_date_arg(date.as_deref(), today)?,
                    days: *days,
                })
            }
        }
    }
}

impl Cli {
    /// Applies command-line overrides on top of loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
    }
}
