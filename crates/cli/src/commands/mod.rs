//! CLI command implementations

pub mod bootstrap;
pub mod normalize;
pub mod report;
pub mod run;

use std::path::Path;

use imdb_loader_core::Store;

use crate::error::CliError;

/// Open an existing database without creating it
pub(crate) fn open_existing(database: &Path) -> Result<Store, CliError> {
    if !database.exists() {
        return Err(CliError::DatabaseNotFound(database.to_path_buf()));
    }
    Ok(Store::open(database)?)
}
