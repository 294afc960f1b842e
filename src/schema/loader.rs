use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::types::{ColumnDef, TableDef};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Parse a JSON schema description: an array of `{table_name, columns}` objects
pub fn parse_tables(json: &str) -> Result<Vec<TableDef>> {
    serde_json::from_str(json).context("Failed to parse schema JSON")
}

/// Load table definitions from a JSON schema file
pub fn load_tables_from_json(path: &Path) -> Result<Vec<TableDef>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read schema: {:?}", path))?;

    parse_tables(&contents).with_context(|| format!("Invalid schema file: {:?}", path))
}

/// Load table definitions from a workbook: one sheet per table, named after
/// the table, with one column per row under a header row
/// (`name`, `type`, `primary_key`, `required`, `unique`, `foreign_key`,
/// `default`, `comment`).
pub fn load_tables_from_xlsx(path: &Path) -> Result<Vec<TableDef>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {:?}", path))?;

    let mut tables = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .with_context(|| format!("Failed to read sheet: {}", sheet))?;
        tables.push(table_from_sheet(&sheet, &range)?);
    }

    Ok(tables)
}

/// Load a schema file, picking the reader from its extension (JSON otherwise)
pub fn load_tables(path: &Path) -> Result<Vec<TableDef>> {
    let is_workbook = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

    if is_workbook {
        load_tables_from_xlsx(path)
    } else {
        load_tables_from_json(path)
    }
}

fn table_from_sheet(sheet: &str, range: &Range<Data>) -> Result<TableDef> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(TableDef::new(sheet, Vec::new()));
    };

    let headers: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| match cell {
            Data::String(s) => Some((s.trim().to_ascii_lowercase(), i)),
            _ => None,
        })
        .collect();

    let mut columns = Vec::new();
    for (offset, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        // Header is row 1
        let line = offset + 2;
        let field = |key: &str| headers.get(key).and_then(|&i| row.get(i));

        let name = cell_text(field("name"))
            .with_context(|| format!("{}: row {} has no column name", sheet, line))?;
        let col_type = cell_text(field("type"))
            .with_context(|| format!("{}: row {} has no column type", sheet, line))?;

        columns.push(ColumnDef {
            name,
            col_type,
            primary_key: cell_flag(field("primary_key")),
            required: cell_flag(field("required")),
            unique: cell_flag(field("unique")),
            foreign_key: cell_text(field("foreign_key")),
            default: cell_text(field("default")),
            comment: cell_text(field("comment")),
        });
    }

    Ok(TableDef::new(sheet, columns))
}

/// Text of a cell; empty and blank cells are `None`
fn cell_text(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some((*f as i64).to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        _ => None,
    }
}

/// Boolean flag cell; anything blank or unrecognised is false
fn cell_flag(cell: Option<&Data>) -> bool {
    match cell {
        Some(Data::Bool(b)) => *b,
        Some(Data::Int(i)) => *i != 0,
        Some(Data::Float(f)) => *f != 0.0,
        Some(Data::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "x" | "1"
        ),
        _ => false,
    }
}
