//! Per-table bulk loading

use std::time::{Duration, Instant};

use rusqlite::{Statement, params_from_iter};
use serde::Serialize;
use tracing::{error, info};

use super::error::{LoadError, RecordError};
use super::progress::{TableProgress, format_number, percent};
use super::schema::{SchemaRegistry, TableSchema};
use super::source::{Record, RowSource};
use super::store::Store;
use crate::config::LoadConfig;

/// The record that stopped a table load
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    /// Position among the data records (header excluded, 0-based)
    pub index: usize,
    /// Field values as read from the source
    pub values: Vec<String>,
    pub reason: RecordError,
}

/// Statistics from loading one table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLoadStats {
    pub table: String,
    /// Data records read from the source (header excluded)
    pub records_read: usize,
    pub records_inserted: usize,
    /// Set when a record stopped the load early
    pub failure: Option<RecordFailure>,
    #[serde(skip)]
    pub duration: Duration,
}

impl TableLoadStats {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            records_read: 0,
            records_inserted: 0,
            failure: None,
            duration: Duration::ZERO,
        }
    }

    /// True when every data record was inserted
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.records_inserted == self.records_read
    }

    /// Records that were never attempted because of an earlier failure
    pub fn records_abandoned(&self) -> usize {
        match &self.failure {
            Some(failure) => self.records_read - failure.index - 1,
            None => 0,
        }
    }

    /// Get records per second throughput
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.records_inserted as f64 / secs
        }
    }
}

/// Loader settings
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Records between progress messages
    pub progress_interval: usize,
    /// Literal accepted by score fields in place of a number
    pub null_sentinel: String,
    /// Draw a terminal progress bar per table
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            progress_interval: 10_000,
            null_sentinel: "NULL".to_string(),
            show_progress: false,
        }
    }
}

impl From<&LoadConfig> for LoadOptions {
    fn from(config: &LoadConfig) -> Self {
        Self {
            progress_interval: config.progress_interval.max(1),
            null_sentinel: config.null_sentinel.clone(),
            show_progress: config.show_progress,
        }
    }
}

/// Loads source records into one table through a single prepared insert
pub struct BulkLoader<'a> {
    registry: &'a SchemaRegistry,
    options: LoadOptions,
}

impl<'a> BulkLoader<'a> {
    pub fn new(registry: &'a SchemaRegistry, options: LoadOptions) -> Self {
        Self { registry, options }
    }

    /// Load every data record of `source` into `table_name`
    ///
    /// The first source record is treated as a header and skipped. The
    /// first record that fails validation or insertion stops the load; it is
    /// reported in the returned stats rather than as an error. Each insert
    /// commits on its own.
    pub fn load(
        &self,
        table_name: &str,
        source: &mut dyn RowSource,
        store: &Store,
    ) -> Result<TableLoadStats, LoadError> {
        let start = Instant::now();
        info!("Loading {} table with {}", table_name, source.describe());

        let mut records = source.read_records()?;
        let records = if records.is_empty() {
            records
        } else {
            records.split_off(1)
        };

        let schema = self.registry.lookup(table_name)?;
        let mut stmt = store
            .connection()
            .prepare(&schema.insert_sql())
            .map_err(|e| LoadError::Prepare {
                table: table_name.to_string(),
                message: e.to_string(),
            })?;

        let mut stats = TableLoadStats::new(table_name);
        stats.records_read = records.len();

        let progress = if self.options.show_progress {
            TableProgress::new(table_name, records.len() as u64)
        } else {
            TableProgress::hidden()
        };
        let interval = self.options.progress_interval.max(1);

        for (index, record) in records.into_iter().enumerate() {
            if let Err(reason) = self.insert_record(schema, &mut stmt, &record) {
                error!(
                    table = table_name,
                    record = index,
                    values = ?record,
                    "Error inserting record: {}",
                    reason
                );
                progress.finish_error(&format!("{} stopped at record {}", table_name, index));
                stats.failure = Some(RecordFailure {
                    index,
                    values: record,
                    reason,
                });
                break;
            }

            stats.records_inserted += 1;
            if index % interval == 0 {
                info!(
                    " {} - Inserted {} records({:.2}%)",
                    table_name,
                    index,
                    percent(index, stats.records_read)
                );
                progress.set_position(stats.records_inserted as u64);
            }
        }

        stats.duration = start.elapsed();
        if stats.failure.is_none() {
            progress.finish_success(&format!(
                "{}: {} records",
                table_name,
                format_number(stats.records_inserted as u64)
            ));
        }

        Ok(stats)
    }

    fn insert_record(
        &self,
        schema: &TableSchema,
        stmt: &mut Statement<'_>,
        record: &Record,
    ) -> Result<(), RecordError> {
        schema.check_record(record, &self.options.null_sentinel)?;
        stmt.execute(params_from_iter(record.iter()))
            .map_err(|e| RecordError::Insert(e.to_string()))?;
        Ok(())
    }
}
