//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// flightdash - yearly airline performance and delay reports
///
/// Loads the US domestic airline dataset once, filters it to a year and
/// builds the charts of the selected report. Markdown/JSON output.
///
/// Examples:
///   flightdash --data airline_data.csv --report performance --year 2010
///   flightdash --data airline_data.csv --report delay --year 2015 --format json
///   flightdash --data airline_data.csv --interactive
///   flightdash --list-years
///   flightdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset to load: a CSV path or an http(s) URL
    ///
    /// Defaults to the [dataset] source of .flightdash.toml, or the public
    /// airline_data.csv copy.
    #[arg(short, long, value_name = "PATH|URL", env = "FLIGHTDASH_DATA")]
    pub data: Option<String>,

    /// Report type: performance (OPT1) or delay (OPT2)
    #[arg(short, long, value_name = "TYPE")]
    pub report: Option<String>,

    /// Year to report on
    ///
    /// Years without data produce empty charts rather than an error.
    #[arg(short, long, value_name = "YEAR", allow_hyphen_values = true)]
    pub year: Option<String>,

    /// Output file path for the report (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .flightdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Read `<report> <year>` selections from stdin and emit one JSON
    /// dashboard per line
    #[arg(short, long, conflicts_with_all = ["report", "year", "output"])]
    pub interactive: bool,

    /// Print the selectable years and exit
    #[arg(long)]
    pub list_years: bool,

    /// Generate a default .flightdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref data) = self.data {
            if data.trim().is_empty() {
                return Err("Data source must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet`
    /// overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
