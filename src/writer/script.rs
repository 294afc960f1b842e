use anyhow::{Context, Result};
use std::io::Write;

use super::connector::Database;
use super::schema_gen::{generate_create_table, generate_drop_table, DropOptions};
use crate::schema::TableDef;

/// Writes statements to a SQL script instead of a live connection.
///
/// Keeps everything PostgreSQL accepts, including column comments, so the
/// output can be fed to `psql` as is.
pub struct ScriptWriter<W: Write> {
    out: W,
    drop_options: DropOptions,
}

impl<W: Write> ScriptWriter<W> {
    /// Drops are written as `DROP TABLE IF EXISTS ... CASCADE`
    pub fn new(out: W) -> Self {
        Self::with_drop_options(
            out,
            DropOptions {
                if_exists: true,
                cascade: true,
            },
        )
    }

    pub fn with_drop_options(out: W, drop_options: DropOptions) -> Self {
        Self { out, drop_options }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Database for ScriptWriter<W> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        writeln!(self.out, "{}", sql).context("Failed to write SQL script")
    }

    fn create_table(&mut self, table: &TableDef) -> Result<()> {
        let create = generate_create_table(table)?;
        self.execute(&create.ddl)?;
        for comment in &create.comments {
            self.execute(comment)?;
        }
        self.execute("")
    }

    fn drop_table(&mut self, table: &TableDef) -> Result<()> {
        let sql = generate_drop_table(table, self.drop_options)?;
        self.execute(&sql)
    }
}
