use serde::Deserialize;

use crate::error::{Result, SchemaError};

/// Column definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    pub name: String,
    /// Logical type tag (text, integer, float, boolean, date, geometry(...))
    #[serde(rename = "type")]
    pub col_type: String,
    #[serde(default)]
    pub primary_key: bool,
    /// Rendered as NOT NULL
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    /// Referenced column as "table.column"
    #[serde(default)]
    pub foreign_key: Option<String>,
    /// Raw SQL literal or expression, emitted verbatim
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ColumnDef {
    /// Create a nullable column without constraints
    pub fn new(name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
            primary_key: false,
            required: false,
            unique: false,
            foreign_key: None,
            default: None,
            comment: None,
        }
    }

    pub fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Reference another table's column ("table.column")
    pub fn references(self, target: impl Into<String>) -> Self {
        Self {
            foreign_key: Some(target.into()),
            ..self
        }
    }

    pub fn default_value(self, expr: impl Into<String>) -> Self {
        Self {
            default: Some(expr.into()),
            ..self
        }
    }

    pub fn comment(self, text: impl Into<String>) -> Self {
        Self {
            comment: Some(text.into()),
            ..self
        }
    }
}

/// Parsed "table.column" foreign key target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyRef<'a> {
    pub table: &'a str,
    pub column: &'a str,
}

impl<'a> ForeignKeyRef<'a> {
    /// Split a foreign key on its single `.`; `None` unless exactly one is present
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (table, column) = raw.split_once('.')?;
        if column.contains('.') {
            return None;
        }
        Some(Self { table, column })
    }
}

/// Table definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableDef {
    #[serde(rename = "table_name")]
    pub name: String,
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Columns carrying a foreign key, with the raw reference
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnDef, &str)> + '_ {
        self.columns
            .iter()
            .filter_map(|col| col.foreign_key.as_deref().map(|fk| (col, fk)))
    }

    /// Parse a column's foreign key, reporting malformed values against this table
    pub fn foreign_key_ref<'a>(&self, column: &ColumnDef, raw: &'a str) -> Result<ForeignKeyRef<'a>> {
        ForeignKeyRef::parse(raw).ok_or_else(|| SchemaError::ForeignKeyFormat {
            table: self.name.clone(),
            column: column.name.clone(),
            value: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_foreign_key() {
        assert_eq!(
            ForeignKeyRef::parse("users.id"),
            Some(ForeignKeyRef {
                table: "users",
                column: "id"
            })
        );
        assert_eq!(ForeignKeyRef::parse("users"), None);
        assert_eq!(ForeignKeyRef::parse("public.users.id"), None);
    }

    #[test]
    fn test_malformed_foreign_key_names_table_and_column() {
        let table = TableDef::new(
            "orders",
            vec![ColumnDef::new("user_id", "integer").references("users_id")],
        );
        let (col, raw) = table.foreign_keys().next().unwrap();
        let err = table.foreign_key_ref(col, raw).unwrap_err();
        assert_eq!(
            err,
            SchemaError::ForeignKeyFormat {
                table: "orders".into(),
                column: "user_id".into(),
                value: "users_id".into(),
            }
        );
    }

    #[test]
    fn test_builder_sets_flags() {
        let col = ColumnDef::new("code", "text")
            .required()
            .unique()
            .default_value("'x'")
            .comment("lab code");
        assert!(col.required && col.unique && !col.primary_key);
        assert_eq!(col.default.as_deref(), Some("'x'"));
        assert_eq!(col.comment.as_deref(), Some("lab code"));
    }
}
