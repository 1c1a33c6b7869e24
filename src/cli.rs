//! Command-line interface parsing for hotel-desk
//!
//! This module handles parsing of CLI arguments using clap. Offline commands
//! (`parse-date`, `check-stay`) only exercise the date parser and stay
//! validation; the others call the booking API.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The `--today` override is not a `YYYY-MM-DD` date
    #[error("Invalid --today value: '{0}'. Expected YYYY-MM-DD")]
    InvalidToday(String),
}

/// hotel-desk - query a hotel booking API from the terminal
#[derive(Parser, Debug)]
#[command(name = "hotel-desk")]
#[command(about = "Hotel booking API client with French date parsing")]
#[command(version)]
pub struct Cli {
    /// Reference date for relative expressions (defaults to the local date)
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Normalize a date expression such as "6 février" or "dans une semaine"
    ParseDate {
        /// The expression to normalize
        expression: String,
    },

    /// Validate a stay without contacting the API
    CheckStay {
        check_in: String,
        check_out: String,
        #[arg(long, default_value_t = 2)]
        adults: u32,
        #[arg(long, default_value_t = 0)]
        children: u32,
    },

    /// Check that the API accepts our credentials
    Ping,

    /// List bookable room types
    RoomTypes,

    /// Show one room type
    RoomType {
        id: u64,
    },

    /// List rooms
    Rooms,

    /// Search availability for a stay
    Availability {
        check_in: String,
        check_out: String,
        #[arg(long, default_value_t = 2)]
        adults: u32,
        #[arg(long, default_value_t = 0)]
        children: u32,
    },
}

/// Parses the `--today` override
///
/// # Returns
/// * `Ok(None)` when no override was given
/// * `Ok(Some(date))` for a valid `YYYY-MM-DD` value
/// * `Err(CliError::InvalidToday)` otherwise
pub fn parse_today_arg(value: Option<&str>) -> Result<Option<NaiveDate>, CliError> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CliError::InvalidToday(s.to_string())),
    }
}
