//! Report error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while generating the ranking report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Query preparation or execution failed
    #[error("Query error: {0}")]
    Query(String),

    /// Output file could not be written
    #[error("Cannot write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Query(msg) if msg.contains("no such table") => {
                format!(
                    "Query error: {msg}\n\n\
                    Hint: The database has not been bootstrapped. Run 'imdb-loader bootstrap' first."
                )
            }
            ReportError::Io { path, source } => {
                format!(
                    "Cannot write report to {}: {source}\n\n\
                    Hint: Check that the output directory exists and is writable.",
                    path.display()
                )
            }
            _ => self.to_string(),
        }
    }
}

impl From<rusqlite::Error> for ReportError {
    fn from(err: rusqlite::Error) -> Self {
        ReportError::Query(err.to_string())
    }
}
