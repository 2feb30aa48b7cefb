//! CLI error types

use std::path::PathBuf;

use imdb_loader_core::{BootstrapError, ReportError, StoreError};
use thiserror::Error;

/// Errors raised by command handlers
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A command that needs a loaded database found no file
    #[error("Database not found: {0}")]
    DatabaseNotFound(PathBuf),

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Get a user-friendly error message, with a hint where one helps
    pub fn user_message(&self) -> String {
        match self {
            CliError::Bootstrap(err) => err.user_message(),
            CliError::Report(err) => err.user_message(),
            CliError::DatabaseNotFound(path) => {
                format!(
                    "Database not found: {}\n\n\
                    Hint: Run 'imdb-loader bootstrap' to create and load it first.",
                    path.display()
                )
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_not_found_hint() {
        let err = CliError::DatabaseNotFound(PathBuf::from("./movies.db"));
        let msg = err.user_message();
        assert!(msg.contains("./movies.db"));
        assert!(msg.contains("bootstrap"));
    }

    #[test]
    fn test_wrapped_errors_keep_their_hints() {
        let err = CliError::from(BootstrapError::Provision(StoreError::Database(
            "disk full".to_string(),
        )));
        assert!(err.user_message().contains("Hint:"));
    }
}
