//! The default `run` command: bootstrap, optional normalization, report

use imdb_loader_core::{
    BootstrapOutcome, LoadConfig, RankingReport, Store, normalize_sentinel_nulls,
};
use tracing::{error, info};

use super::bootstrap::handle_bootstrap;
use crate::error::CliError;
use crate::output::RunSummary;

/// Bootstrap the database, then write the ranking report
///
/// Sentinel normalization only runs right after a fresh load. Report
/// failures are logged and recorded in the summary without failing the run.
pub fn handle_run(config: &LoadConfig) -> Result<RunSummary, CliError> {
    let bootstrap = handle_bootstrap(config)?;

    let store = Store::open(&config.database)?;

    let normalized = match &bootstrap {
        BootstrapOutcome::Loaded(_) if config.normalize_nulls => {
            Some(normalize_sentinel_nulls(&store, &config.null_sentinel)?)
        }
        _ => None,
    };

    let (report, report_error) =
        match RankingReport::new(config.report.top_n).generate(&store, &config.report.output) {
            Ok(stats) => {
                info!(rows = stats.rows_written, "Ranking report complete");
                (Some(stats), None)
            }
            Err(err) => {
                error!("Error generating report: {}", err);
                (None, Some(err.to_string()))
            }
        };

    store.close()?;

    Ok(RunSummary {
        bootstrap,
        normalized,
        report,
        report_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    fn write_artifacts(config: &LoadConfig) {
        let data = &config.data_dir;
        fs::create_dir_all(data).unwrap();
        write(&data.join("IMDB-actors.csv"), "id,first_name,last_name,gender\n");
        write(
            &data.join("IMDB-movies.csv"),
            "id,name,year,rank\n1,Alpha,2000,8.5\n2,Beta,1999,NULL\n",
        );
        write(&data.join("IMDB-directors.csv"), "id,first_name,last_name\n");
        write(&data.join("IMDB-roles.csv"), "actor_id,movie_id,role\n");
        write(&data.join("IMDB-movies_genres.csv"), "movie_id,genre\n1,Drama\n2,Drama\n");
        write(&data.join("IMDB-directors_genres.csv"), "director_id,genre,prob\n");
    }

    fn config_for(dir: &TempDir, normalize: bool) -> LoadConfig {
        LoadConfig::builder()
            .database(dir.path().join("movies.db"))
            .data_dir(dir.path().join("data"))
            .report_output(dir.path().join("query_results.csv"))
            .normalize_nulls(normalize)
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, false);
        write_artifacts(&config);

        let summary = handle_run(&config).unwrap();
        assert!(!summary.bootstrap.is_skipped());
        assert_eq!(summary.normalized, None);
        assert_eq!(summary.report.unwrap().rows_written, 1);
        assert_eq!(
            fs::read_to_string(&config.report.output).unwrap(),
            "Drama,\"Alpha\",2000,8.5\n"
        );

        // second run skips loading but still reports
        let summary = handle_run(&config).unwrap();
        assert!(summary.bootstrap.is_skipped());
        assert_eq!(summary.report.unwrap().rows_written, 1);
    }

    #[test]
    fn test_run_with_normalization() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, true);
        write_artifacts(&config);

        let summary = handle_run(&config).unwrap();
        assert_eq!(summary.normalized, Some(1));
        assert_eq!(summary.report.unwrap().rows_written, 1);
    }

    #[test]
    fn test_run_report_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let config = LoadConfig::builder()
            .base(config_for(&dir, false))
            .report_output(dir.path().join("no-such-dir").join("out.csv"))
            .build()
            .unwrap();
        write_artifacts(&config);

        let summary = handle_run(&config).unwrap();
        assert!(summary.report.is_none());
        assert!(summary.report_error.is_some());
    }
}
