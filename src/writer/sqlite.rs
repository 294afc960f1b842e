use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::Path;

use super::connector::Database;
use super::schema_gen::{generate_create_table, generate_drop_table, is_geometry_type, DropOptions};
use crate::schema::TableDef;

/// Applies DDL to a SQLite database
pub struct SqliteConnector {
    conn: Connection,
}

impl SqliteConnector {
    /// Open (or create) the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Names of the user tables currently in the database
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}

impl Database for SqliteConnector {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    fn check_table(&self, table: &TableDef) -> Result<()> {
        for col in &table.columns {
            if is_geometry_type(&col.col_type) {
                bail!(
                    "SQLite cannot store geometry column {}.{} ({}); use a PostgreSQL database",
                    table.name,
                    col.name,
                    col.col_type
                );
            }
        }
        Ok(())
    }

    fn create_table(&mut self, table: &TableDef) -> Result<()> {
        self.check_table(table)?;
        let create = generate_create_table(table)?;
        self.execute(&create.ddl)
            .with_context(|| format!("Failed to create table: {}", table.name))?;

        // SQLite has no COMMENT ON
        if !create.comments.is_empty() {
            tracing::debug!(
                table = %table.name,
                count = create.comments.len(),
                "skipping column comments"
            );
        }

        Ok(())
    }

    fn drop_table(&mut self, table: &TableDef) -> Result<()> {
        // CASCADE is not valid SQLite syntax; callers drop dependents first
        let sql = generate_drop_table(table, DropOptions::default())?;
        self.execute(&sql)
            .with_context(|| format!("Failed to drop table: {}", table.name))
    }
}
