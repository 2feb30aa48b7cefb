//! One-time bootstrap of the movies database

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::bulk::{BulkLoader, LoadOptions, TableLoadStats};
use super::error::BootstrapError;
use super::provision::Provisioner;
use super::schema::{SchemaRegistry, TableName};
use super::source::CsvRowSource;
use super::store::Store;
use crate::config::LoadConfig;

/// A table whose load ended with an error rather than stats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFailure {
    pub table: TableName,
    pub message: String,
}

/// Summary of a bootstrap that created and loaded a database
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapReport {
    pub database: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Tables provisioned, in creation order
    pub tables_created: Vec<TableName>,
    /// Per-table load statistics, in load order
    pub tables: Vec<TableLoadStats>,
    /// Tables that could not be loaded at all
    pub table_errors: Vec<TableFailure>,
    #[serde(skip)]
    pub duration: Duration,
}

impl BootstrapReport {
    fn new(database: PathBuf) -> Self {
        Self {
            database,
            started_at: Utc::now(),
            tables_created: Vec::new(),
            tables: Vec::new(),
            table_errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Records inserted across all tables
    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.records_inserted).sum()
    }

    /// Names of tables that stopped early or failed outright
    pub fn failed_tables(&self) -> Vec<String> {
        self.tables
            .iter()
            .filter(|t| t.failure.is_some())
            .map(|t| t.table.clone())
            .chain(self.table_errors.iter().map(|f| f.table.to_string()))
            .collect()
    }

    /// Stats for one table, if it was loaded
    pub fn table(&self, name: TableName) -> Option<&TableLoadStats> {
        self.tables.iter().find(|t| t.table == name.as_str())
    }

    /// Format duration as human-readable string
    pub fn duration_string(&self) -> String {
        let secs = self.duration.as_secs();
        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }
}

/// Result of a bootstrap call
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BootstrapOutcome {
    /// The database file already existed; nothing was touched
    Skipped { database: PathBuf },
    /// The database was created and loaded
    Loaded(BootstrapReport),
}

impl BootstrapOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, BootstrapOutcome::Skipped { .. })
    }
}

/// Runs provisioning and the per-table loads against a new database file
pub struct Bootstrapper<'a> {
    config: &'a LoadConfig,
    registry: &'a SchemaRegistry,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(config: &'a LoadConfig, registry: &'a SchemaRegistry) -> Self {
        Self { config, registry }
    }

    /// Create, provision and load the database unless its file already exists
    ///
    /// A fatal source error or a provisioning failure aborts the run and
    /// leaves the partially built database in place.
    pub fn bootstrap(&self) -> Result<BootstrapOutcome, BootstrapError> {
        let database = &self.config.database;
        if database.exists() {
            info!(
                database = %database.display(),
                "Database already exists. Skipping creation process"
            );
            return Ok(BootstrapOutcome::Skipped {
                database: database.clone(),
            });
        }

        let start = Instant::now();
        self.registry.validate_dependency_order()?;

        let mut report = BootstrapReport::new(database.clone());
        info!(database = %database.display(), "Creating database");

        let store = Store::open(database)?;
        report.tables_created = Provisioner::new(self.registry)
            .provision(&store)
            .map_err(BootstrapError::Provision)?;
        store.close()?;

        let store = Store::open(database)?;
        if let Some(mode) = self.config.synchronous {
            store.set_synchronous(mode)?;
        }

        let loader = BulkLoader::new(self.registry, LoadOptions::from(self.config));
        for table in self.registry.tables() {
            let mut source = CsvRowSource::new(self.config.artifact_path(table.name));

            match loader.load(table.name.as_str(), &mut source, &store) {
                Ok(stats) => {
                    if let Some(failure) = &stats.failure {
                        warn!(
                            table = %table.name,
                            inserted = stats.records_inserted,
                            "Load stopped at record {}: {}",
                            failure.index,
                            failure.reason
                        );
                    } else {
                        info!(
                            table = %table.name,
                            inserted = stats.records_inserted,
                            "Table loaded"
                        );
                    }
                    report.tables.push(stats);
                }
                Err(err) if err.is_fatal() => {
                    return Err(BootstrapError::Load {
                        table: table.name.to_string(),
                        source: err,
                    });
                }
                Err(err) => {
                    error!(table = %table.name, "Error loading table: {}", err);
                    report.table_errors.push(TableFailure {
                        table: table.name,
                        message: err.to_string(),
                    });
                }
            }
        }

        store.close()?;
        report.duration = start.elapsed();
        info!(
            inserted = report.total_inserted(),
            duration = %report.duration_string(),
            "Bootstrap complete"
        );

        Ok(BootstrapOutcome::Loaded(report))
    }
}
