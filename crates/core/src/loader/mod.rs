//! Bulk-load pipeline for the movies database
//!
//! This module provides:
//! - A SQLite store handle
//! - The table schema registry and provisioner
//! - CSV row sources
//! - The per-table bulk loader and the bootstrap orchestrator

pub mod bulk;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod progress;
pub mod provision;
pub mod schema;
pub mod source;
pub mod store;

pub use bulk::{BulkLoader, LoadOptions, RecordFailure, TableLoadStats};
pub use error::{BootstrapError, LoadError, RecordError, SchemaError, StoreError};
pub use normalize::normalize_sentinel_nulls;
pub use orchestrator::{BootstrapOutcome, BootstrapReport, Bootstrapper, TableFailure};
pub use progress::{TableProgress, format_number, percent};
pub use provision::Provisioner;
pub use schema::{Binding, ColumnDef, FieldKind, ForeignKey, SchemaRegistry, TableName, TableSchema};
pub use source::{CsvRowSource, MemoryRowSource, Record, RowSource};
pub use store::Store;
