//! Output formatting for CLI

use serde::Serialize;

use imdb_loader_core::loader::format_number;
use imdb_loader_core::{BootstrapOutcome, BootstrapReport, ReportStats};

use crate::error::CliError;

/// Combined result of the default `run` command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub bootstrap: BootstrapOutcome,
    /// Movies whose sentinel rank was rewritten, when normalization ran
    pub normalized: Option<usize>,
    pub report: Option<ReportStats>,
    /// Report failure, which does not fail the run
    pub report_error: Option<String>,
}

/// Print any serializable result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a human readable bootstrap summary
pub fn print_bootstrap_outcome(outcome: &BootstrapOutcome) {
    match outcome {
        BootstrapOutcome::Skipped { database } => {
            println!("Database already exists at {}; nothing loaded.", database.display());
        }
        BootstrapOutcome::Loaded(report) => print_bootstrap_report(report),
    }
}

fn print_bootstrap_report(report: &BootstrapReport) {
    println!();
    println!("Bootstrap complete: {}", report.database.display());
    println!("  Tables created: {}", report.tables_created.len());
    println!(
        "  Records inserted: {}",
        format_number(report.total_inserted() as u64)
    );
    println!("  Duration: {}", report.duration_string());
    println!();

    for stats in &report.tables {
        let status = if stats.failure.is_some() { "✗" } else { "✓" };
        println!(
            "  {} {:<18} {:>10} / {:<10} ({:.0} rows/sec)",
            status,
            stats.table,
            format_number(stats.records_inserted as u64),
            format_number(stats.records_read as u64),
            stats.throughput()
        );
        if let Some(failure) = &stats.failure {
            println!("      stopped at record {}: {}", failure.index, failure.reason);
            println!("      values: {:?}", failure.values);
        }
    }

    for failure in &report.table_errors {
        println!("  ✗ {:<18} {}", failure.table, failure.message);
    }
}

/// Print the outcome of a normalization pass
pub fn print_normalized(updated: usize, sentinel: &str) {
    println!(
        "Normalized {} movie rank(s) stored as '{}' to NULL",
        format_number(updated as u64),
        sentinel
    );
}

/// Print a report summary
pub fn print_report_stats(stats: &ReportStats, output: &std::path::Path) {
    println!(
        "Report written to {} ({} rows)",
        output.display(),
        format_number(stats.rows_written as u64)
    );
    if stats.rows_skipped > 0 {
        println!("  Rows skipped: {}", stats.rows_skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_run_summary_json() {
        let summary = RunSummary {
            bootstrap: BootstrapOutcome::Skipped {
                database: PathBuf::from("movies.db"),
            },
            normalized: None,
            report: Some(ReportStats {
                rows_written: 4,
                rows_skipped: 0,
            }),
            report_error: None,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["bootstrap"]["status"], "skipped");
        assert_eq!(json["bootstrap"]["database"], "movies.db");
        assert_eq!(json["report"]["rowsWritten"], 4);
        assert!(json["reportError"].is_null());
    }
}
