//! Idempotent schema provisioning

use tracing::{debug, info};

use super::error::StoreError;
use super::schema::{SchemaRegistry, TableName};
use super::store::Store;

/// Creates every registered table that does not exist yet
pub struct Provisioner<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Provisioner<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Issue one `CREATE TABLE IF NOT EXISTS` per table, in registry order
    ///
    /// Stops at the first rejected statement; tables created before it are
    /// left in place. Returns the tables in the order their statements ran.
    pub fn provision(&self, store: &Store) -> Result<Vec<TableName>, StoreError> {
        let mut provisioned = Vec::with_capacity(self.registry.tables().len());

        for table in self.registry.tables() {
            let sql = table.create_table_sql();
            debug!(table = %table.name, "Creating table");
            store.connection().execute(&sql, [])?;
            provisioned.push(table.name);
        }

        info!(tables = provisioned.len(), "Tables successfully created");
        Ok(provisioned)
    }
}
