//! flightdash - yearly US domestic airline reports
//!
//! A CLI tool that loads the airline flight-performance dataset once,
//! filters it to a selected year and builds the charts of the yearly
//! performance or delay report as renderer-agnostic specifications.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (dataset load, config, output failure, etc.)

mod analysis;
mod charts;
mod cli;
mod config;
mod dataset;
mod models;
mod report;
mod session;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE};
use dataset::DataSource;
use models::ReportSelection;
use report::{DashboardReport, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration; it can raise the log level, so it comes first.
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("flightdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run(args, config).await {
        error!("Failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .flightdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the data source, default selection and year range.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so that reports and session output on stdout stay
/// machine-readable.
fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run(args: Args, config: Config) -> Result<()> {
    if args.list_years {
        for year in config.dashboard.years() {
            println!("{}", year);
        }
        return Ok(());
    }

    // Dataset load failure is fatal.
    let source = DataSource::parse(&config.dataset.source);
    let dataset = dataset::load(&source, !args.quiet)
        .await
        .with_context(|| format!("Failed to load dataset from {}", source))?;
    if dataset.is_empty() {
        warn!("Dataset {} has no records", source);
    }
    debug!("Years with data: {:?}", dataset.years());

    if args.interactive {
        let initial =
            ReportSelection::new(config.dashboard.default_report, config.dashboard.default_year);
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        session::run_session(&dataset, Some(initial), stdin, tokio::io::stdout()).await?;
        return Ok(());
    }

    let report_raw = args
        .report
        .clone()
        .unwrap_or_else(|| config.dashboard.default_report.as_str().to_string());
    let year_raw = args
        .year
        .clone()
        .unwrap_or_else(|| config.dashboard.default_year.to_string());

    if let Ok(year) = year_raw.trim().parse::<i32>() {
        if !config.dashboard.in_range(year) {
            warn!(
                "Year {} is outside {}-{}; the report will likely be empty",
                year, config.dashboard.first_year, config.dashboard.last_year
            );
        }
    }

    let dashboard = charts::build_from_raw(&dataset, &report_raw, &year_raw);

    let report = DashboardReport::new(
        ReportMetadata {
            title: config.report.title.clone(),
            data_source: source.to_string(),
            records_loaded: dataset.len(),
            generated_at: Utc::now(),
        },
        dashboard,
    );

    let format = config.general.format;
    if config.general.output.is_empty() {
        let content = match format {
            cli::OutputFormat::Json => report::generate_json_report(&report)?,
            cli::OutputFormat::Markdown => {
                report::generate_markdown_report(&report, config.report.max_rows)
            }
        };
        println!("{}", content);
    } else {
        let path = Path::new(&config.general.output);
        report::write_report(&report, format, config.report.max_rows, path)?;

        if !args.quiet {
            let label = report
                .dashboard
                .selection
                .map(|s| format!("{} for {}", s.report_type, s.year))
                .unwrap_or_else(|| "blank dashboard".to_string());
            eprintln!("\n📊 {}: {} chart(s)", label, report.dashboard.chart_count());
            eprintln!("✅ Report saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
