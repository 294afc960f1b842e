//! Applies a whole schema to a [`Database`] in dependency order.
//!
//! Every table is validated before the first statement runs, so a bad table
//! anywhere in the schema leaves the database untouched.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::error::IdentifierRole;
use crate::schema::{load_tables_from_json, sort_tables_by_dependency, TableDef};
use crate::writer::{generate_create_table, validate_identifier, Database};

/// References provided by the database itself (PostGIS)
pub const DEFAULT_IGNORED_REFS: &[&str] = &["spatial_ref_sys.srid"];

pub fn default_ignored_refs() -> HashSet<String> {
    DEFAULT_IGNORED_REFS.iter().map(|s| s.to_string()).collect()
}

/// Create all tables, parents before children. Returns the number created.
pub fn create_tables<D: Database + ?Sized>(
    tables: &[TableDef],
    ignore_refs: &HashSet<String>,
    db: &mut D,
) -> Result<usize> {
    let ordered = sort_tables_by_dependency(tables, ignore_refs)?;

    for table in &ordered {
        generate_create_table(table)
            .with_context(|| format!("Invalid table definition: {}", table.name))?;
        db.check_table(table)?;
    }

    tracing::info!(tables = ordered.len(), "creating tables");
    for table in &ordered {
        tracing::debug!(table = %table.name, "create");
        db.create_table(table)?;
    }

    Ok(ordered.len())
}

/// Drop all tables, children before parents. Returns the number dropped.
pub fn drop_tables<D: Database + ?Sized>(
    tables: &[TableDef],
    ignore_refs: &HashSet<String>,
    db: &mut D,
) -> Result<usize> {
    let ordered = sort_tables_by_dependency(tables, ignore_refs)?;

    for table in &ordered {
        validate_identifier(&table.name, IdentifierRole::TableName)
            .with_context(|| format!("Invalid table definition: {}", table.name))?;
    }

    tracing::info!(tables = ordered.len(), "dropping tables");
    for table in ordered.iter().rev() {
        tracing::debug!(table = %table.name, "drop");
        db.drop_table(table)?;
    }

    Ok(ordered.len())
}

pub fn create_tables_from_json<D: Database + ?Sized>(
    json_path: &Path,
    ignore_refs: &HashSet<String>,
    db: &mut D,
) -> Result<usize> {
    let tables = load_tables_from_json(json_path)?;
    create_tables(&tables, ignore_refs, db)
}

pub fn drop_tables_from_json<D: Database + ?Sized>(
    json_path: &Path,
    ignore_refs: &HashSet<String>,
    db: &mut D,
) -> Result<usize> {
    let tables = load_tables_from_json(json_path)?;
    drop_tables(&tables, ignore_refs, db)
}
