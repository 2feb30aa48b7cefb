//! IMDB loader core - bootstraps the movies database from CSV extracts
//!
//! Provides:
//! - A typed table schema registry and idempotent schema provisioning
//! - CSV row sources and a fail-fast bulk loader with progress reporting
//! - A load orchestrator that only runs against a brand-new database file
//! - Optional normalization of rank sentinel values into SQL NULL
//! - The top-N movies per genre ranking report

pub mod config;
pub mod loader;
pub mod report;

pub use config::{ConfigError, LoadConfig, LoadConfigBuilder, ReportConfig, SyncMode};
pub use loader::{
    BootstrapError, BootstrapOutcome, BootstrapReport, Bootstrapper, BulkLoader, CsvRowSource,
    FieldKind, LoadError, LoadOptions, MemoryRowSource, Provisioner, RecordError, RecordFailure,
    RowSource, SchemaError, SchemaRegistry, Store, StoreError, TableLoadStats, TableName,
    TableSchema, normalize_sentinel_nulls,
};
pub use report::{RankedMovie, RankingReport, ReportError, ReportStats};
