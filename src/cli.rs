use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::batch::DEFAULT_IGNORED_REFS;

#[derive(Parser, Debug)]
#[command(name = "schema-ddl")]
#[command(version, about = "Create and drop tables from a JSON or workbook schema in foreign-key order")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print table names in creation order
    Order {
        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Write the DDL script (PostgreSQL) for all tables
    Sql {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Write DROP statements (dependents first) instead of CREATE
        #[arg(long)]
        drop: bool,

        /// Omit CASCADE from DROP statements
        #[arg(long)]
        no_cascade: bool,

        /// Omit IF EXISTS from DROP statements
        #[arg(long)]
        no_if_exists: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create all tables in a SQLite or PostgreSQL database
    Create {
        #[command(flatten)]
        schema: SchemaArgs,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Drop all tables (dependents first) from a SQLite or PostgreSQL database
    Drop {
        #[command(flatten)]
        schema: SchemaArgs,

        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Database the DDL is applied to; exactly one must be given
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// SQLite database path (geometry columns are not supported)
    #[arg(short, long, env = "SCHEMA_DDL_DATABASE")]
    pub database: Option<PathBuf>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Schema file: JSON, or a workbook (.xlsx, .ods, ...) with one sheet per table
    pub schema: PathBuf,

    /// Foreign key targets ("table.column") allowed to be missing (comma-separated).
    /// Passing any value replaces the default spatial_ref_sys.srid
    #[arg(long = "ignore-ref", value_delimiter = ',', default_values_t = DEFAULT_IGNORED_REFS.iter().map(|s| s.to_string()))]
    pub ignore_refs: Vec<String>,
}

impl SchemaArgs {
    pub fn ignore_set(&self) -> HashSet<String> {
        self.ignore_refs.iter().cloned().collect()
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
