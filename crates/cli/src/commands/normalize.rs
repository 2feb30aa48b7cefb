//! The `normalize` command

use imdb_loader_core::{LoadConfig, normalize_sentinel_nulls};

use super::open_existing;
use crate::error::CliError;

/// Rewrite sentinel ranks to NULL in an existing database
pub fn handle_normalize(config: &LoadConfig) -> Result<usize, CliError> {
    let store = open_existing(&config.database)?;
    let updated = normalize_sentinel_nulls(&store, &config.null_sentinel)?;
    store.close()?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_requires_database() {
        let dir = TempDir::new().unwrap();
        let config = LoadConfig::builder()
            .database(dir.path().join("movies.db"))
            .build()
            .unwrap();

        let err = handle_normalize(&config).unwrap_err();
        assert!(matches!(err, CliError::DatabaseNotFound(_)));
        assert!(!config.database.exists());
    }
}
