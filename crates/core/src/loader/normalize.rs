//! Sentinel rank normalization

use tracing::info;

use super::error::StoreError;
use super::store::Store;

/// Replace sentinel ranks with real NULLs
///
/// Returns the number of movies updated. Safe to run repeatedly.
pub fn normalize_sentinel_nulls(store: &Store, sentinel: &str) -> Result<usize, StoreError> {
    let updated = store
        .connection()
        .execute("UPDATE movies SET rank = NULL WHERE rank = ?1", [sentinel])?;
    info!(updated, sentinel, "Normalized sentinel ranks");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::provision::Provisioner;
    use crate::loader::schema::SchemaRegistry;

    fn store_with_movies() -> Store {
        let store = Store::memory().unwrap();
        Provisioner::new(&SchemaRegistry::imdb())
            .provision(&store)
            .unwrap();
        store
            .connection()
            .execute_batch(
                "INSERT INTO movies (id, name, year, rank) VALUES
                    (1, 'Alpha', 2000, '8.5'),
                    (2, 'Beta', 1999, 'NULL'),
                    (3, 'Gamma', 2001, 'NULL'),
                    (4, 'Delta', 2002, NULL);",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_normalize_rewrites_sentinel_only() {
        let store = store_with_movies();

        assert_eq!(normalize_sentinel_nulls(&store, "NULL").unwrap(), 2);

        let nulls: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM movies WHERE rank IS NULL", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(nulls, 3);

        let rank: f64 = store
            .connection()
            .query_row("SELECT rank FROM movies WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rank, 8.5);
    }

    #[test]
    fn test_normalize_is_repeatable() {
        let store = store_with_movies();
        normalize_sentinel_nulls(&store, "NULL").unwrap();
        assert_eq!(normalize_sentinel_nulls(&store, "NULL").unwrap(), 0);
    }

    #[test]
    fn test_normalize_custom_sentinel() {
        let store = store_with_movies();
        assert_eq!(normalize_sentinel_nulls(&store, "\\N").unwrap(), 0);
    }

    #[test]
    fn test_normalize_without_schema_fails() {
        let store = Store::memory().unwrap();
        assert!(matches!(
            normalize_sentinel_nulls(&store, "NULL"),
            Err(StoreError::Database(_))
        ));
    }
}
