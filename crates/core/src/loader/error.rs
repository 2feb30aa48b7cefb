//! Error types for store, schema and load operations

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::schema::FieldKind;

/// Errors raised by the SQLite store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the table schema registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Foreign keys form a cycle, so no creation order exists
    #[error("Foreign key cycle involving table '{0}'")]
    DependencyCycle(String),

    /// A foreign key points at a table the registry does not define
    #[error("Table '{table}' references unregistered table '{referenced}'")]
    UnknownReference { table: String, referenced: String },

    /// A referencing table is ordered before the table it references
    #[error("Table '{table}' is ordered before '{referenced}', which it references")]
    OutOfOrder { table: String, referenced: String },
}

/// Errors that can occur while loading one table
#[derive(Error, Debug)]
pub enum LoadError {
    /// Table name outside the registry
    #[error("Unrecognized table: {0}")]
    UnknownTable(String),

    /// Source artifact missing
    #[error("File not found: {0}")]
    SourceNotFound(PathBuf),

    /// Source artifact could not be tokenized
    #[error("Malformed CSV in {path}: {reason}")]
    MalformedCsv { path: PathBuf, reason: String },

    /// Insert statement could not be prepared
    #[error("Error preparing insert for '{table}': {message}")]
    Prepare { table: String, message: String },

    /// Store error wrapper
    #[error(transparent)]
    Store(#[from] StoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a bootstrap run
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Registry ordering is not dependency safe
    #[error("Invalid schema registry: {0}")]
    Schema(#[from] SchemaError),

    /// A create statement was rejected
    #[error("Schema provisioning failed: {0}")]
    Provision(StoreError),

    /// A source artifact could not be read
    #[error("Failed to load table '{table}': {source}")]
    Load {
        table: String,
        #[source]
        source: LoadError,
    },

    /// Opening or closing the store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reason a single source record was rejected
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum RecordError {
    /// Record has the wrong number of fields for the table
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    /// Field does not match the column's coarse type
    #[error("field '{column}' expects {expected}, got {value:?}")]
    FieldKind {
        column: String,
        expected: FieldKind,
        value: String,
    },

    /// The store rejected the insert
    #[error("insert rejected: {0}")]
    Insert(String),
}

impl LoadError {
    /// Source errors mean the artifact set is unusable; everything else is table-local
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LoadError::SourceNotFound(_) | LoadError::MalformedCsv { .. } | LoadError::Io(_)
        )
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            LoadError::SourceNotFound(path) => {
                format!(
                    "File not found: {}\n\nHint: Check that the data directory contains the IMDB-*.csv extracts.",
                    path.display()
                )
            }
            LoadError::MalformedCsv { path, reason } => {
                format!(
                    "Malformed CSV in {}\nReason: {reason}\n\nHint: Check the file's quoting around the reported position.",
                    path.display()
                )
            }
            LoadError::UnknownTable(name) => {
                format!(
                    "Unrecognized table: {name}\n\n\
                    Hint: Expected one of actors, movies, directors, roles, movies_genres, directors_genres."
                )
            }
            _ => self.to_string(),
        }
    }
}

impl BootstrapError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            BootstrapError::Provision(err) => {
                format!(
                    "Schema provisioning failed: {err}\n\n\
                    Hint: Delete the partially created database file and run again."
                )
            }
            BootstrapError::Load { table, source } => {
                format!(
                    "Failed to load table '{table}'.\n{}\n\n\
                    Hint: Delete the partially loaded database file before running again.",
                    source.user_message()
                )
            }
            _ => self.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<rusqlite::Error> for LoadError {
    fn from(err: rusqlite::Error) -> Self {
        LoadError::Store(StoreError::from(err))
    }
}
