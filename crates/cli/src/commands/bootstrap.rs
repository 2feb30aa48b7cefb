//! The `bootstrap` command

use imdb_loader_core::{BootstrapOutcome, Bootstrapper, LoadConfig, SchemaRegistry};

use crate::error::CliError;

/// Create and load the database unless it already exists
pub fn handle_bootstrap(config: &LoadConfig) -> Result<BootstrapOutcome, CliError> {
    let registry = SchemaRegistry::imdb();
    let outcome = Bootstrapper::new(config, &registry).bootstrap()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_without_artifacts_fails() {
        let dir = TempDir::new().unwrap();
        let config = LoadConfig::builder()
            .database(dir.path().join("movies.db"))
            .data_dir(dir.path().join("missing"))
            .build()
            .unwrap();

        let err = handle_bootstrap(&config).unwrap_err();
        assert!(matches!(err, CliError::Bootstrap(_)));
        assert!(err.user_message().contains("IMDB-actors.csv"));
    }

    #[test]
    fn test_bootstrap_existing_database_skips() {
        let dir = TempDir::new().unwrap();
        let database = dir.path().join("movies.db");
        fs::write(&database, b"").unwrap();
        let config = LoadConfig::builder().database(&database).build().unwrap();

        assert!(handle_bootstrap(&config).unwrap().is_skipped());
    }
}
