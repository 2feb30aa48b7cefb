//! SQLite store handle

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::error::StoreError;
use crate::config::SyncMode;

/// Handle to the movies database
///
/// Statements prepared from [`Store::connection`] borrow the handle, so they
/// are always finalized before the connection closes.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Get the database path (if not in-memory)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Set the `synchronous` pragma for this connection
    pub fn set_synchronous(&self, mode: SyncMode) -> Result<(), StoreError> {
        self.conn
            .pragma_update(None, "synchronous", mode.as_pragma())?;
        Ok(())
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Names of all user tables, in creation order
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Get the row count of a table
    ///
    /// `table` is interpolated into the statement, so it must come from the
    /// schema registry rather than user input.
    pub fn row_count(&self, table: &str) -> Result<i64, StoreError> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    /// Close the connection, surfacing any error from finalizing it
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_memory() {
        let store = Store::memory().unwrap();
        assert!(store.path().is_none());
        assert!(!store.table_exists("movies").unwrap());
        assert!(store.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_store_open_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies.db");

        let store = Store::open(&path).unwrap();
        store
            .connection()
            .execute_batch("CREATE TABLE movies (id INTEGER PRIMARY KEY)")
            .unwrap();
        store.close().unwrap();

        assert!(path.exists());
        let store = Store::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert!(store.table_exists("movies").unwrap());
        assert_eq!(store.row_count("movies").unwrap(), 0);
    }

    #[test]
    fn test_store_set_synchronous() {
        let store = Store::memory().unwrap();
        store.set_synchronous(SyncMode::Off).unwrap();
        let mode: i64 = store
            .connection()
            .query_row("PRAGMA synchronous", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, 0);
    }
}
