//! Row sources for the bulk loader

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::LoadError;

/// One tokenized source record
pub type Record = Vec<String>;

/// A sequence of delimited text records
///
/// Sources return every record, header included; the loader decides what
/// to discard.
pub trait RowSource {
    /// Label used in log messages
    fn describe(&self) -> String;

    /// Read all records in file order
    fn read_records(&mut self) -> Result<Vec<Record>, LoadError>;
}

/// CSV file source
///
/// Accepts quoted fields, records with differing field counts and stray
/// quotes. A quote inside a quoted field that is not doubled and not
/// followed by a delimiter or the end of the record is kept as a literal
/// character, so `"The "Kid" Returns"` reads as `The "Kid" Returns`.
/// Invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    /// Create a source for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for CsvRowSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_records(&mut self) -> Result<Vec<Record>, LoadError> {
        let data = fs::read(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => LoadError::SourceNotFound(self.path.clone()),
            _ => LoadError::Io(err),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        // record boundaries come from the csv reader; quoted records are
        // re-split from their raw bytes with lazy quote rules
        let mut parsed = Vec::new();
        for result in reader.byte_records() {
            let record = result.map_err(|err| csv_error(&self.path, err))?;
            let start = record.position().map_or(0, |pos| pos.byte() as usize);
            parsed.push((start, record));
        }

        let mut records = Vec::with_capacity(parsed.len());
        for (i, (start, record)) in parsed.iter().enumerate() {
            let end = parsed.get(i + 1).map_or(data.len(), |(next, _)| *next);
            let raw = data.get(*start..end).map(trim_record).unwrap_or_default();

            let fields: Record = if raw.contains(&b'"') {
                split_lazy(raw).iter().map(|field| lossy(field)).collect()
            } else {
                record.iter().map(lossy).collect()
            };
            records.push(fields);
        }

        Ok(records)
    }
}

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Strip line terminators, skipped blank lines and a leading byte order mark
fn trim_record(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    let start = raw
        .iter()
        .position(|b| !matches!(b, b'\n' | b'\r'))
        .unwrap_or(raw.len());
    let end = raw
        .iter()
        .rposition(|b| !matches!(b, b'\n' | b'\r'))
        .map_or(start, |last| last + 1);
    &raw[start..end]
}

/// Split one raw record into fields, keeping stray quotes literally
fn split_lazy(raw: &[u8]) -> Vec<Vec<u8>> {
    let mut fields = Vec::new();
    let mut i = 0;

    loop {
        let mut field = Vec::new();
        if raw.get(i) == Some(&b'"') {
            i += 1;
            while let Some(&byte) = raw.get(i) {
                if byte != b'"' {
                    field.push(byte);
                    i += 1;
                    continue;
                }
                match raw.get(i + 1) {
                    Some(b'"') => {
                        field.push(b'"');
                        i += 2;
                    }
                    Some(b',') | None => {
                        i += 1;
                        break;
                    }
                    Some(_) => {
                        field.push(b'"');
                        i += 1;
                    }
                }
            }
        } else {
            while let Some(&byte) = raw.get(i) {
                if byte == b',' {
                    break;
                }
                field.push(byte);
                i += 1;
            }
        }
        fields.push(field);

        if raw.get(i) == Some(&b',') {
            i += 1;
        } else {
            return fields;
        }
    }
}

/// Map a csv reader error onto a load error
///
/// Flexible byte records leave the reader nothing to reject but I/O, so
/// `MalformedCsv` is only reached if a future reader setting adds checks
/// (UTF-8 or field count validation).
fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => LoadError::Io(io),
        _ => LoadError::MalformedCsv {
            path: path.to_path_buf(),
            reason,
        },
    }
}

/// In-memory source, mainly for tests and programmatic loads
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    records: Vec<Record>,
}

impl MemoryRowSource {
    /// Build a source from string slices, header first
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            records: rows
                .iter()
                .map(|row| row.iter().map(|field| field.to_string()).collect())
                .collect(),
        }
    }
}

impl From<Vec<Record>> for MemoryRowSource {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RowSource for MemoryRowSource {
    fn describe(&self) -> String {
        format!("<memory: {} records>", self.records.len())
    }

    fn read_records(&mut self) -> Result<Vec<Record>, LoadError> {
        Ok(std::mem::take(&mut self.records))
    }
}
