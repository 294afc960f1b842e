use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{IdentifierRole, Result, SchemaError};
use crate::schema::TableDef;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// PostGIS column type, e.g. `geometry(Point, 4326)`
static GEOMETRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^geometry\(\s*\w+\s*(,\s*\d+)?\s*\)$").expect("geometry pattern")
});

/// Statements produced for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub ddl: String,
    /// One `COMMENT ON COLUMN` per commented column
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOptions {
    pub if_exists: bool,
    pub cascade: bool,
}

impl Default for DropOptions {
    fn default() -> Self {
        Self {
            if_exists: true,
            cascade: false,
        }
    }
}

/// Reject anything that is not a plain SQL identifier.
///
/// Identifiers are spliced into statements unquoted, so this must run before
/// any of them reaches a format string.
pub fn validate_identifier(value: &str, role: IdentifierRole) -> Result<()> {
    if IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(SchemaError::Identifier {
            role,
            value: value.to_string(),
        })
    }
}

/// Whether a logical type is a PostGIS geometry passed through as is
pub fn is_geometry_type(logical_type: &str) -> bool {
    GEOMETRY.is_match(logical_type)
}

/// Map a logical column type to its SQL type
pub fn map_type(logical_type: &str) -> Result<&str> {
    let sql_type = match logical_type {
        "text" => "TEXT",
        "integer" => "INTEGER",
        "float" => "DOUBLE PRECISION",
        "boolean" => "BOOLEAN",
        "date" => "DATE",
        other if is_geometry_type(other) => other,
        other => {
            return Err(SchemaError::UnsupportedType {
                type_name: other.to_string(),
            })
        }
    };
    Ok(sql_type)
}

/// Generate CREATE TABLE SQL and column comments for a table
pub fn generate_create_table(table: &TableDef) -> Result<CreateTable> {
    validate_identifier(&table.name, IdentifierRole::TableName)?;

    let mut columns = Vec::with_capacity(table.columns.len());
    let mut comments = Vec::new();

    for col in &table.columns {
        validate_identifier(&col.name, IdentifierRole::ColumnName)?;

        let mut line = format!("  {} {}", col.name, map_type(&col.col_type)?);

        if col.primary_key {
            line.push_str(" PRIMARY KEY");
        }
        if col.required {
            line.push_str(" NOT NULL");
        }
        if col.unique {
            line.push_str(" UNIQUE");
        }
        if let Some(default) = &col.default {
            line.push_str(" DEFAULT ");
            line.push_str(default);
        }
        if let Some(raw) = &col.foreign_key {
            let fk = table.foreign_key_ref(col, raw)?;
            validate_identifier(fk.table, IdentifierRole::ForeignKeyTable)?;
            validate_identifier(fk.column, IdentifierRole::ForeignKeyColumn)?;
            line.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
        }

        columns.push(line);

        if let Some(comment) = col.comment.as_deref().filter(|c| !c.is_empty()) {
            comments.push(format!(
                "COMMENT ON COLUMN {}.{} IS '{}';",
                table.name,
                col.name,
                comment.replace('\'', "''")
            ));
        }
    }

    let mut ddl = format!("CREATE TABLE {} (\n", table.name);
    if !columns.is_empty() {
        ddl.push_str(&columns.join(",\n"));
        ddl.push('\n');
    }
    ddl.push_str(");");

    Ok(CreateTable { ddl, comments })
}

/// Generate DROP TABLE SQL for a table
pub fn generate_drop_table(table: &TableDef, options: DropOptions) -> Result<String> {
    validate_identifier(&table.name, IdentifierRole::TableName)?;

    let mut sql = String::from("DROP TABLE ");
    if options.if_exists {
        sql.push_str("IF EXISTS ");
    }
    sql.push_str(&table.name);
    if options.cascade {
        sql.push_str(" CASCADE");
    }
    sql.push(';');

    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;

    #[test]
    fn test_generate_create_table() {
        let table = TableDef::new(
            "t",
            vec![ColumnDef::new("c", "text")
                .required()
                .unique()
                .default_value("'x'")
                .comment("it's a code")],
        );
        let out = generate_create_table(&table).unwrap();
        assert_eq!(out.ddl, "CREATE TABLE t (\n  c TEXT NOT NULL UNIQUE DEFAULT 'x'\n);");
        assert_eq!(out.comments, vec!["COMMENT ON COLUMN t.c IS 'it''s a code';"]);
    }

    #[test]
    fn test_clause_order_and_column_order() {
        let table = TableDef::new(
            "assays",
            vec![
                ColumnDef::new("id", "integer").primary_key().required(),
                ColumnDef::new("sample_id", "integer")
                    .required()
                    .default_value("0")
                    .references("samples.id"),
                ColumnDef::new("grade", "float"),
                ColumnDef::new("logged_on", "date").default_value("CURRENT_DATE"),
                ColumnDef::new("valid", "boolean").comment(""),
            ],
        );
        let out = generate_create_table(&table).unwrap();
        assert_eq!(
            out.ddl,
            "CREATE TABLE assays (\n\
             \x20 id INTEGER PRIMARY KEY NOT NULL,\n\
             \x20 sample_id INTEGER NOT NULL DEFAULT 0 REFERENCES samples(id),\n\
             \x20 grade DOUBLE PRECISION,\n\
             \x20 logged_on DATE DEFAULT CURRENT_DATE,\n\
             \x20 valid BOOLEAN\n\
             );"
        );
        assert!(out.comments.is_empty());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let table = TableDef::new(
            "holes",
            vec![
                ColumnDef::new("id", "integer").primary_key(),
                ColumnDef::new("name", "text").comment("collar name"),
                ColumnDef::new("depth", "float").comment("metres"),
            ],
        );
        let first = generate_create_table(&table).unwrap();
        let second = generate_create_table(&table).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.comments,
            vec![
                "COMMENT ON COLUMN holes.name IS 'collar name';",
                "COMMENT ON COLUMN holes.depth IS 'metres';",
            ]
        );
    }

    #[test]
    fn test_table_without_columns() {
        let out = generate_create_table(&TableDef::new("empty", vec![])).unwrap();
        assert_eq!(out.ddl, "CREATE TABLE empty (\n);");
    }

    #[test]
    fn test_invalid_table_name() {
        let table = TableDef::new("1bad", vec![ColumnDef::new("id", "integer")]);
        let err = generate_create_table(&table).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Identifier {
                role: IdentifierRole::TableName,
                value: "1bad".into()
            }
        );
    }

    #[test]
    fn test_invalid_column_name() {
        let table = TableDef::new("t", vec![ColumnDef::new("id; DROP TABLE x", "integer")]);
        let err = generate_create_table(&table).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Identifier {
                role: IdentifierRole::ColumnName,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_foreign_key_parts() {
        let table = TableDef::new(
            "t",
            vec![ColumnDef::new("a_id", "integer").references("a-b.id")],
        );
        assert!(matches!(
            generate_create_table(&table).unwrap_err(),
            SchemaError::Identifier {
                role: IdentifierRole::ForeignKeyTable,
                ..
            }
        ));

        let table = TableDef::new("t", vec![ColumnDef::new("a_id", "integer").references("a.")]);
        assert!(matches!(
            generate_create_table(&table).unwrap_err(),
            SchemaError::Identifier {
                role: IdentifierRole::ForeignKeyColumn,
                ..
            }
        ));

        let table = TableDef::new("t", vec![ColumnDef::new("a_id", "integer").references("a")]);
        assert!(matches!(
            generate_create_table(&table).unwrap_err(),
            SchemaError::ForeignKeyFormat { .. }
        ));
    }

    #[test]
    fn test_map_type() {
        assert_eq!(map_type("float").unwrap(), "DOUBLE PRECISION");
        assert_eq!(map_type("geometry(Point, 4326)").unwrap(), "geometry(Point, 4326)");
        assert_eq!(map_type("GEOMETRY( LineString )").unwrap(), "GEOMETRY( LineString )");
        assert_eq!(
            map_type("varchar").unwrap_err(),
            SchemaError::UnsupportedType {
                type_name: "varchar".into()
            }
        );
        assert!(map_type("TEXT").is_err());
        assert!(map_type("geometry(Point, 4326); DROP TABLE t").is_err());
    }

    #[test]
    fn test_generate_drop_table() {
        let table = TableDef::new("t", vec![]);
        let sql = |if_exists, cascade| {
            generate_drop_table(&table, DropOptions { if_exists, cascade }).unwrap()
        };
        assert_eq!(sql(true, true), "DROP TABLE IF EXISTS t CASCADE;");
        assert_eq!(sql(true, false), "DROP TABLE IF EXISTS t;");
        assert_eq!(sql(false, true), "DROP TABLE t CASCADE;");
        assert_eq!(sql(false, false), "DROP TABLE t;");
        assert_eq!(
            generate_drop_table(&table, DropOptions::default()).unwrap(),
            "DROP TABLE IF EXISTS t;"
        );
    }

    #[test]
    fn test_drop_validates_name() {
        let table = TableDef::new("t t", vec![]);
        assert!(generate_drop_table(&table, DropOptions::default()).is_err());
    }
}
