//! Configuration types for bootstrap and reporting

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loader::TableName;

/// Errors while reading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// SQLite `synchronous` setting used while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Off,
    Normal,
    Full,
}

impl SyncMode {
    /// Pragma value
    pub fn as_pragma(&self) -> &'static str {
        match self {
            SyncMode::Off => "OFF",
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
        }
    }
}

impl std::str::FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(SyncMode::Off),
            "normal" => Ok(SyncMode::Normal),
            "full" => Ok(SyncMode::Full),
            _ => Err(format!(
                "Invalid synchronous mode: {}. Expected: off, normal, full",
                s
            )),
        }
    }
}

/// Ranking report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output CSV file, overwritten on every run
    pub output: PathBuf,
    /// Movies kept per genre
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("./query_results.csv"),
            top_n: 3,
        }
    }
}

/// Configuration for a bootstrap run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Database file; its existence means the bootstrap already ran
    pub database: PathBuf,
    /// Directory holding the CSV extracts
    pub data_dir: PathBuf,
    /// File name prefix of every extract (`<prefix><table>.csv`)
    pub file_prefix: String,
    /// Records between progress messages
    pub progress_interval: usize,
    /// Literal used by the source data for an unknown rank
    pub null_sentinel: String,
    /// Rewrite sentinel ranks into NULL after loading
    pub normalize_nulls: bool,
    /// Draw terminal progress bars
    pub show_progress: bool,
    /// Optional `synchronous` pragma for the loading connection
    pub synchronous: Option<SyncMode>,
    /// Report settings
    pub report: ReportConfig,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("./movies.db"),
            data_dir: PathBuf::from("./data"),
            file_prefix: "IMDB-".to_string(),
            progress_interval: 10_000,
            null_sentinel: "NULL".to_string(),
            normalize_nulls: false,
            show_progress: false,
            synchronous: None,
            report: ReportConfig::default(),
        }
    }
}

impl LoadConfig {
    /// Create a new builder for LoadConfig
    pub fn builder() -> LoadConfigBuilder {
        LoadConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LoadConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be greater than zero".to_string(),
            ));
        }
        if self.null_sentinel.is_empty() {
            return Err(ConfigError::Invalid(
                "null_sentinel must not be empty".to_string(),
            ));
        }
        if self.report.top_n == 0 {
            return Err(ConfigError::Invalid(
                "report.top_n must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the CSV extract for a table
    pub fn artifact_path(&self, table: TableName) -> PathBuf {
        self.data_dir
            .join(format!("{}{}.csv", self.file_prefix, table.as_str()))
    }
}

/// Builder for LoadConfig
#[derive(Debug, Default)]
pub struct LoadConfigBuilder {
    base: Option<LoadConfig>,
    database: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    file_prefix: Option<String>,
    progress_interval: Option<usize>,
    null_sentinel: Option<String>,
    normalize_nulls: Option<bool>,
    show_progress: Option<bool>,
    synchronous: Option<SyncMode>,
    report_output: Option<PathBuf>,
    top_n: Option<usize>,
}

impl LoadConfigBuilder {
    /// Start from an existing configuration (e.g. one read from a file)
    pub fn base(mut self, config: LoadConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the database path
    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Set the CSV directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Set the extract file prefix
    pub fn file_prefix(mut self, prefix: &str) -> Self {
        self.file_prefix = Some(prefix.to_string());
        self
    }

    /// Set the progress message interval
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Set the rank sentinel literal
    pub fn null_sentinel(mut self, sentinel: &str) -> Self {
        self.null_sentinel = Some(sentinel.to_string());
        self
    }

    /// Enable sentinel normalization after loading
    pub fn normalize_nulls(mut self, normalize: bool) -> Self {
        self.normalize_nulls = Some(normalize);
        self
    }

    /// Enable terminal progress bars
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = Some(show);
        self
    }

    /// Set the `synchronous` pragma used while loading
    pub fn synchronous(mut self, mode: SyncMode) -> Self {
        self.synchronous = Some(mode);
        self
    }

    /// Set the report output file
    pub fn report_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_output = Some(path.into());
        self
    }

    /// Set the number of movies kept per genre
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    /// Build and validate the LoadConfig
    pub fn build(self) -> Result<LoadConfig, ConfigError> {
        let base = self.base.unwrap_or_default();

        let config = LoadConfig {
            database: self.database.unwrap_or(base.database),
            data_dir: self.data_dir.unwrap_or(base.data_dir),
            file_prefix: self.file_prefix.unwrap_or(base.file_prefix),
            progress_interval: self.progress_interval.unwrap_or(base.progress_interval),
            null_sentinel: self.null_sentinel.unwrap_or(base.null_sentinel),
            normalize_nulls: self.normalize_nulls.unwrap_or(base.normalize_nulls),
            show_progress: self.show_progress.unwrap_or(base.show_progress),
            synchronous: self.synchronous.or(base.synchronous),
            report: ReportConfig {
                output: self.report_output.unwrap_or(base.report.output),
                top_n: self.top_n.unwrap_or(base.report.top_n),
            },
        };

        config.validate()?;
        Ok(config)
    }
}
