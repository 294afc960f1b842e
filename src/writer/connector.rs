use anyhow::Result;

use crate::schema::TableDef;

/// A target that generated DDL can be applied to.
///
/// Implementations own transactions, connection handling, and whatever SQL
/// their backend cannot accept. Statements are applied one at a time.
pub trait Database {
    /// Run a single SQL statement
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Reject a table this backend cannot create, before anything is executed
    fn check_table(&self, _table: &TableDef) -> Result<()> {
        Ok(())
    }

    /// Generate and run CREATE TABLE (and column comments, where supported)
    fn create_table(&mut self, table: &TableDef) -> Result<()>;

    /// Generate and run DROP TABLE
    fn drop_table(&mut self, table: &TableDef) -> Result<()>;
}
