//! The `report` command

use imdb_loader_core::{LoadConfig, RankingReport, ReportStats};

use super::open_existing;
use crate::error::CliError;

/// Write the top movies per genre to the configured output file
pub fn handle_report(config: &LoadConfig) -> Result<ReportStats, CliError> {
    let store = open_existing(&config.database)?;
    let stats = RankingReport::new(config.report.top_n).generate(&store, &config.report.output)?;
    Ok(stats)
}
