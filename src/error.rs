use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Where an identifier was found when it failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierRole {
    TableName,
    ColumnName,
    ForeignKeyTable,
    ForeignKeyColumn,
}

impl fmt::Display for IdentifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierRole::TableName => write!(f, "table name"),
            IdentifierRole::ColumnName => write!(f, "column name"),
            IdentifierRole::ForeignKeyTable => write!(f, "foreign key table"),
            IdentifierRole::ForeignKeyColumn => write!(f, "foreign key column"),
        }
    }
}

/// One offending table and what is wrong with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub table: String,
    /// Sorted table names (missing targets or unresolved dependencies)
    pub details: Vec<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [{}]", self.table, self.details.join(", "))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid foreign_key format in {table}.{column}: {value}")]
    ForeignKeyFormat {
        table: String,
        column: String,
        value: String,
    },

    #[error("missing referenced tables: {}", join_violations(.0))]
    MissingReferences(Vec<Violation>),

    #[error("cyclic dependency detected among tables: {}", join_violations(.0))]
    Cycle(Vec<Violation>),

    #[error("duplicate table name: {name}")]
    DuplicateTable { name: String },

    #[error("invalid {role}: '{value}'")]
    Identifier { role: IdentifierRole, value: String },

    #[error("unsupported or unsafe type: '{type_name}'")]
    UnsupportedType { type_name: String },
}

impl SchemaError {
    /// Per-table entries for the aggregate variants, empty for the rest
    pub fn violations(&self) -> &[Violation] {
        match self {
            SchemaError::MissingReferences(v) | SchemaError::Cycle(v) => v,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_message_lists_every_table() {
        let err = SchemaError::Cycle(vec![
            Violation {
                table: "a".into(),
                details: vec!["b".into()],
            },
            Violation {
                table: "b".into(),
                details: vec!["a".into(), "c".into()],
            },
        ]);
        assert_eq!(
            err.to_string(),
            "cyclic dependency detected among tables: a -> [b]; b -> [a, c]"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_identifier_message_names_role() {
        let err = SchemaError::Identifier {
            role: IdentifierRole::ForeignKeyColumn,
            value: "1bad".into(),
        };
        assert_eq!(err.to_string(), "invalid foreign key column: '1bad'");
        assert!(err.violations().is_empty());
    }
}
