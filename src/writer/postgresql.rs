use anyhow::{Context, Result};
use postgres::{Client, NoTls};

use super::connector::Database;
use super::schema_gen::{generate_create_table, generate_drop_table, DropOptions};
use crate::schema::TableDef;

/// Applies DDL to a live PostgreSQL database.
///
/// Each table's CREATE and its column comments run in one transaction.
pub struct PostgresConnector {
    client: Client,
    drop_options: DropOptions,
}

impl PostgresConnector {
    /// Connect using a `postgres://` URL or key/value connection string.
    /// Drops are issued as `DROP TABLE IF EXISTS ... CASCADE`.
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::connect(url, NoTls).context("Failed to connect to PostgreSQL")?;
        Ok(Self {
            client,
            drop_options: DropOptions {
                if_exists: true,
                cascade: true,
            },
        })
    }

    pub fn with_drop_options(self, drop_options: DropOptions) -> Self {
        Self {
            drop_options,
            ..self
        }
    }

    /// Tables in the connection's current schema
    pub fn table_names(&mut self) -> Result<Vec<String>> {
        let rows = self.client.query(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = current_schema() ORDER BY table_name",
            &[],
        )?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    /// Comment stored on a column, if any
    pub fn column_comment(&mut self, table: &str, column: &str) -> Result<Option<String>> {
        let row = self.client.query_one(
            "SELECT col_description(a.attrelid, a.attnum) \
             FROM pg_attribute a JOIN pg_class c ON c.oid = a.attrelid \
             WHERE c.relname = $1 AND a.attname = $2 AND pg_table_is_visible(c.oid)",
            &[&table, &column],
        )?;
        Ok(row.get(0))
    }
}

impl Database for PostgresConnector {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.client
            .batch_execute(sql)
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    fn create_table(&mut self, table: &TableDef) -> Result<()> {
        let create = generate_create_table(table)?;

        let mut tx = self.client.transaction()?;
        tx.batch_execute(&create.ddl)
            .with_context(|| format!("Failed to create table: {}", table.name))?;
        for comment in &create.comments {
            tx.batch_execute(comment)
                .with_context(|| format!("Failed to comment on: {}", table.name))?;
        }
        tx.commit()?;

        Ok(())
    }

    fn drop_table(&mut self, table: &TableDef) -> Result<()> {
        let sql = generate_drop_table(table, self.drop_options)?;
        self.execute(&sql)
            .with_context(|| format!("Failed to drop table: {}", table.name))
    }
}
