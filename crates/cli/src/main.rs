//! imdb-loader CLI - bootstrap the movies database and write the genre ranking report.

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use imdb_loader_core::{LoadConfig, SyncMode};
use tracing::{Level, info};

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "imdb-loader")]
#[command(about = "Bootstrap the IMDB movies database from CSV extracts and rank movies per genre")]
#[command(version)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Override the directory holding the IMDB-*.csv extracts
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the report output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the number of movies reported per genre
    #[arg(long)]
    top_n: Option<usize>,

    /// Override the literal that marks an unknown rank
    #[arg(long)]
    null_sentinel: Option<String>,

    /// Rewrite sentinel ranks to NULL after a fresh load
    #[arg(long)]
    normalize_nulls: bool,

    /// SQLite synchronous mode while loading: off, normal, full
    #[arg(long)]
    synchronous: Option<SyncMode>,

    /// Show a progress bar per table
    #[arg(long)]
    progress: bool,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Bootstrap if needed, then write the ranking report (default)
    Run,
    /// Create and load the database unless it already exists
    Bootstrap,
    /// Rewrite sentinel ranks to NULL in an existing database
    Normalize,
    /// Write the ranking report from an existing database
    Report,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<CliError>() {
                Some(cli_err) => eprintln!("Error: {}", cli_err.user_message()),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    info!(
        database = %config.database.display(),
        data_dir = %config.data_dir.display(),
        "Loaded configuration"
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let summary = commands::run::handle_run(&config)?;
            if cli.output_json {
                output::print_json(&summary)?;
            } else {
                output::print_bootstrap_outcome(&summary.bootstrap);
                if let Some(updated) = summary.normalized {
                    output::print_normalized(updated, &config.null_sentinel);
                }
                match (&summary.report, &summary.report_error) {
                    (Some(stats), _) => output::print_report_stats(stats, &config.report.output),
                    (None, Some(message)) => println!("Report not written: {}", message),
                    (None, None) => {}
                }
            }
        }
        Commands::Bootstrap => {
            let outcome = commands::bootstrap::handle_bootstrap(&config)?;
            if cli.output_json {
                output::print_json(&outcome)?;
            } else {
                output::print_bootstrap_outcome(&outcome);
            }
        }
        Commands::Normalize => {
            let updated = commands::normalize::handle_normalize(&config)?;
            if cli.output_json {
                output::print_json(&serde_json::json!({ "normalized": updated }))?;
            } else {
                output::print_normalized(updated, &config.null_sentinel);
            }
        }
        Commands::Report => {
            let stats = commands::report::handle_report(&config)?;
            if cli.output_json {
                output::print_json(&stats)?;
            } else {
                output::print_report_stats(&stats, &config.report.output);
            }
        }
    }

    Ok(())
}

/// Read the optional config file and apply command line overrides
fn load_config(cli: &Cli) -> anyhow::Result<LoadConfig> {
    let base = match &cli.config {
        Some(path) => LoadConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => LoadConfig::default(),
    };

    let mut builder = LoadConfig::builder().base(base);
    if let Some(database) = &cli.database {
        builder = builder.database(database);
    }
    if let Some(data_dir) = &cli.data_dir {
        builder = builder.data_dir(data_dir);
    }
    if let Some(output) = &cli.output {
        builder = builder.report_output(output);
    }
    if let Some(top_n) = cli.top_n {
        builder = builder.top_n(top_n);
    }
    if let Some(sentinel) = &cli.null_sentinel {
        builder = builder.null_sentinel(sentinel);
    }
    if let Some(mode) = cli.synchronous {
        builder = builder.synchronous(mode);
    }
    if cli.normalize_nulls {
        builder = builder.normalize_nulls(true);
    }
    if cli.progress {
        builder = builder.show_progress(true);
    }

    builder.build().context("Invalid configuration")
}

/// Install the stderr log subscriber
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["imdb-loader"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.verbosity, "info");

        let cli = Cli::try_parse_from(["imdb-loader", "report"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Report));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("imdb.toml");
        fs::write(
            &path,
            "database = \"/srv/movies.db\"\ndata_dir = \"/srv/data\"\n\n[report]\ntop_n = 5\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "imdb-loader",
            "--config",
            path.to_str().unwrap(),
            "--database",
            "/tmp/movies.db",
            "--synchronous",
            "off",
            "--normalize-nulls",
            "bootstrap",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.database, PathBuf::from("/tmp/movies.db"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.synchronous, Some(SyncMode::Off));
        assert!(config.normalize_nulls);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = Cli::try_parse_from(["imdb-loader", "--top-n", "0"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("top_n"));
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["imdb-loader", "--config", "/nonexistent/imdb.toml"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/imdb.toml"));
    }
}
