use anyhow::{Context, Result};
use schema_ddl::{
    batch::{create_tables, drop_tables},
    cli::{Cli, Commands, TargetArgs},
    logging::init_tracing,
    schema::{load_tables, sort_tables_by_dependency},
    writer::{Database, DropOptions, PostgresConnector, ScriptWriter, SqliteConnector},
};
use std::fs::File;
use std::io::{self, BufWriter, Write};

fn open_database(target: &TargetArgs) -> Result<Box<dyn Database>> {
    match (&target.database_url, &target.database) {
        (Some(url), _) => {
            tracing::info!("connecting to PostgreSQL");
            Ok(Box::new(PostgresConnector::connect(url)?))
        }
        (None, Some(path)) => {
            tracing::info!(path = ?path, "opening SQLite database");
            Ok(Box::new(SqliteConnector::open(path)?))
        }
        (None, None) => anyhow::bail!("No database given: pass --database or --database-url"),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Order { schema } => {
            let tables = load_tables(&schema.schema)?;
            for table in sort_tables_by_dependency(&tables, &schema.ignore_set())? {
                println!("{}", table.name);
            }
        }

        Commands::Sql {
            schema,
            drop,
            no_cascade,
            no_if_exists,
            output,
        } => {
            let tables = load_tables(&schema.schema)?;

            let out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("Failed to create: {:?}", path))?,
                )),
                None => Box::new(io::stdout().lock()),
            };

            let options = DropOptions {
                if_exists: !no_if_exists,
                cascade: !no_cascade,
            };
            let mut script = ScriptWriter::with_drop_options(out, options);

            let ignore = schema.ignore_set();
            let count = if drop {
                drop_tables(&tables, &ignore, &mut script)?
            } else {
                create_tables(&tables, &ignore, &mut script)?
            };
            script.into_inner().flush().context("Failed to write SQL script")?;

            if let Some(path) = output {
                eprintln!("Wrote {} tables to {:?}", count, path);
            }
        }

        Commands::Create { schema, target } => {
            let tables = load_tables(&schema.schema)?;
            let mut db = open_database(&target)?;
            let count = create_tables(&tables, &schema.ignore_set(), &mut *db)?;
            println!("{} tables have been created", count);
        }

        Commands::Drop { schema, target } => {
            let tables = load_tables(&schema.schema)?;
            let mut db = open_database(&target)?;
            let count = drop_tables(&tables, &schema.ignore_set(), &mut *db)?;
            println!("{} tables have been dropped", count);
        }
    }

    Ok(())
}
