//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.flightdash.toml` files.

use crate::cli::OutputFormat;
use crate::models::ReportType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".flightdash.toml";

/// Public copy of the airline performance dataset.
pub const DEFAULT_DATA_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMDeveloperSkillsNetwork-DV0101EN-SkillsNetwork/Data%20Files/airline_data.csv";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Dashboard selection settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file path. Empty means stdout.
    #[serde(default)]
    pub output: String,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where the flight data is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Local CSV path or http(s) URL.
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
        }
    }
}

fn default_source() -> String {
    DEFAULT_DATA_URL.to_string()
}

/// Default selection and the year list offered to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub default_report: ReportType,

    #[serde(default = "default_year")]
    pub default_year: i32,

    /// First year of the selectable range.
    #[serde(default = "default_first_year")]
    pub first_year: i32,

    /// Last year of the selectable range (inclusive).
    #[serde(default = "default_last_year")]
    pub last_year: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_report: ReportType::default(),
            default_year: default_year(),
            first_year: default_first_year(),
            last_year: default_last_year(),
        }
    }
}

impl DashboardConfig {
    /// The selectable years, ascending.
    pub fn years(&self) -> Vec<i32> {
        (self.first_year..=self.last_year).collect()
    }

    pub fn in_range(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }
}

fn default_year() -> i32 {
    2010
}

fn default_first_year() -> i32 {
    2005
}

fn default_last_year() -> i32 {
    2020
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dashboard title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Maximum table rows printed per chart in Markdown output.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            max_rows: default_max_rows(),
        }
    }
}

fn default_title() -> String {
    "US Domestic Airline Flights Performance".to_string()
}

fn default_max_rows() -> usize {
    25
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.flightdash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.dataset.source = data.clone();
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset.source, DEFAULT_DATA_URL);
        assert_eq!(config.dashboard.default_report, ReportType::Performance);
        assert_eq!(config.dashboard.default_year, 2010);
        assert_eq!(config.dashboard.years().len(), 16);
        assert_eq!(config.general.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "dashboard.json"
format = "json"
verbose = true

[dataset]
source = "data/airline_data.csv"

[dashboard]
default_report = "delay"
default_year = 2015
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "dashboard.json");
        assert_eq!(config.general.format, OutputFormat::Json);
        assert!(config.general.verbose);
        assert_eq!(config.dataset.source, "data/airline_data.csv");
        assert_eq!(config.dashboard.default_report, ReportType::Delay);
        assert_eq!(config.dashboard.default_year, 2015);
        assert_eq!(config.dashboard.first_year, 2005);
        assert_eq!(config.report.max_rows, 25);
    }

    #[test]
    fn test_year_range() {
        let dashboard = DashboardConfig::default();
        assert!(dashboard.in_range(2005));
        assert!(dashboard.in_range(2020));
        assert!(!dashboard.in_range(2025));
        assert_eq!(dashboard.years().first(), Some(&2005));
        assert_eq!(dashboard.years().last(), Some(&2020));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = Args::parse_from([
            "flightdash",
            "--data",
            "local.csv",
            "--format",
            "json",
            "--verbose",
        ]);
        config.merge_with_args(&args);

        assert_eq!(config.dataset.source, "local.csv");
        assert_eq!(config.general.format, OutputFormat::Json);
        assert!(config.general.verbose);
        // Not given on the command line: keep the config value.
        assert_eq!(config.general.output, "");
    }

    #[test]
    fn test_verbose_setting_raises_log_level() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = Args::parse_from(["flightdash"]);
        assert_eq!(args.log_level(Config::default().general.verbose), tracing::Level::INFO);

        config.merge_with_args(&args);
        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE)).unwrap();
        writeln!(file, "[report]\nmax_rows = 5").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.report.max_rows, 5);
        assert_eq!(config.report.title, "US Domestic Airline Flights Performance");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[dataset]"));
        assert!(toml_str.contains("[dashboard]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.dashboard.last_year, 2020);
    }
}
