//! Top movies per genre

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rusqlite::Row;
use serde::Serialize;
use tracing::{info, warn};

use super::error::ReportError;
use crate::loader::Store;

/// Per genre, the highest ranked movies among those with a numeric rank
const RANKING_QUERY: &str = "
    WITH ranked_movies AS (
        SELECT
            mg.genre,
            m.name,
            m.year,
            m.rank,
            ROW_NUMBER() OVER (
                PARTITION BY mg.genre
                ORDER BY m.rank DESC
            ) AS rank_position
        FROM movies m
        INNER JOIN movies_genres mg ON m.id = mg.movie_id
        WHERE typeof(m.rank) IN ('integer', 'real')
    )
    SELECT genre, name, year, rank
    FROM ranked_movies
    WHERE rank_position <= ?1
    ORDER BY genre, rank DESC";

/// One report line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMovie {
    pub genre: String,
    pub name: String,
    pub year: i64,
    pub rank: f64,
}

impl RankedMovie {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            genre: row.get(0)?,
            name: row.get(1)?,
            year: row.get(2)?,
            rank: row.get(3)?,
        })
    }

    /// Render as `genre,"name",year,rank` with the rank to one decimal
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},\"{}\",{},{:.1}",
            self.genre,
            self.name.replace('"', "\"\""),
            self.year,
            self.rank
        )
    }
}

/// Counters from one report run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub rows_written: usize,
    /// Rows that could not be decoded
    pub rows_skipped: usize,
}

/// Generates the ranking report
#[derive(Debug, Clone, Copy)]
pub struct RankingReport {
    top_n: usize,
}

impl Default for RankingReport {
    fn default() -> Self {
        Self { top_n: 3 }
    }
}

impl RankingReport {
    /// Report keeping `top_n` movies per genre
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Run the ranking query and write its rows to `output`
    ///
    /// The output file is truncated only once the query has been accepted,
    /// so a failing query leaves a previous report intact.
    pub fn generate(&self, store: &Store, output: &Path) -> Result<ReportStats, ReportError> {
        let mut stmt = store.connection().prepare(RANKING_QUERY)?;
        let mut rows = stmt.query([self.top_n as i64])?;

        let file = File::create(output).map_err(|e| ReportError::io(output, e))?;
        let mut writer = BufWriter::new(file);
        let mut stats = ReportStats::default();

        while let Some(row) = rows.next()? {
            let movie = match RankedMovie::from_row(row) {
                Ok(movie) => movie,
                Err(e) => {
                    warn!("Error scanning row: {}", e);
                    stats.rows_skipped += 1;
                    continue;
                }
            };

            writeln!(writer, "{}", movie.to_csv_line()).map_err(|e| ReportError::io(output, e))?;
            stats.rows_written += 1;
        }

        writer.flush().map_err(|e| ReportError::io(output, e))?;
        info!(
            output = %output.display(),
            rows = stats.rows_written,
            skipped = stats.rows_skipped,
            "Report written"
        );

        Ok(stats)
    }
}
