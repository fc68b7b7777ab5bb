//! automigrate CLI
//!
//! Diffs two JSON schema snapshots and prints or writes the up/down
//! migration SQL.

mod files;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use automigrate_core::prelude::*;

use crate::files::{load_snapshot, render_sql, write_migration};

/// Generate up/down migration SQL from two schema snapshots.
#[derive(Parser)]
#[command(name = "automigrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema rendered without qualification.
    #[arg(long, env = "AUTOMIGRATE_DEFAULT_SCHEMA", default_value = "public", global = true)]
    default_schema: String,

    /// Disable possible-rename warnings.
    #[arg(long, global = true)]
    no_rename_hints: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// The two snapshots every command compares.
#[derive(clap::Args)]
struct SnapshotArgs {
    /// JSON snapshot of the live database schema.
    #[arg(short, long)]
    current: PathBuf,

    /// JSON snapshot of the declared schema.
    #[arg(short, long)]
    desired: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the migration SQL.
    Generate {
        #[command(flatten)]
        snapshots: SnapshotArgs,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Sql)]
        format: Format,

        /// Which half of the migration to print (SQL format only).
        #[arg(long, value_enum, default_value_t = Direction::Both)]
        direction: Direction,
    },

    /// Write timestamped `.up.sql` and `.down.sql` files.
    Write {
        #[command(flatten)]
        snapshots: SnapshotArgs,

        /// Migration name/description.
        #[arg(short, long)]
        name: String,

        /// Migrations directory.
        #[arg(short, long, env = "AUTOMIGRATE_MIGRATIONS_DIR", default_value = "migrations")]
        migrations_dir: PathBuf,
    },

    /// Exit with status 1 if the snapshots differ.
    Check {
        #[command(flatten)]
        snapshots: SnapshotArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Sql,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Direction {
    Up,
    Down,
    Both,
}

fn run(snapshots: &SnapshotArgs, options: &AutogenOptions) -> anyhow::Result<MigrationResult> {
    let current = load_snapshot(&snapshots.current)?;
    let desired = load_snapshot(&snapshots.desired)?;
    let result = autogenerate_migration_with(&current, &desired, options, &PostgresDialect::new())
        .context("failed to generate migration")?;
    for warning in &result.warnings {
        warn!("{}", describe_warning(warning));
    }
    Ok(result)
}

fn describe_warning(warning: &DiffWarning) -> String {
    match warning {
        DiffWarning::PossibleColumnRename {
            table,
            old_column,
            new_column,
            similarity,
        } => format!(
            "{table}: '{old_column}' dropped and '{new_column}' added; possible rename ({:.0}% similar), data in '{old_column}' will be lost",
            similarity * 100.0
        ),
        DiffWarning::PossibleTableRename {
            old_table,
            new_table,
            similarity,
        } => format!(
            "table '{old_table}' dropped and '{new_table}' created with the same columns; possible rename ({:.0}% similar)",
            similarity * 100.0
        ),
        DiffWarning::ColumnOrderChanged { table, .. } => {
            format!("{table}: column order changed; existing columns are not reordered")
        }
        DiffWarning::SchemaChanged { table, from, to } => {
            format!("{table}: schema changed from '{from}' to '{to}'; the table is not moved")
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut options = AutogenOptions::new().with_default_schema(cli.default_schema);
    if cli.no_rename_hints {
        options = options.without_rename_detection();
    }

    match cli.command {
        Commands::Generate {
            snapshots,
            format,
            direction,
        } => {
            let result = run(&snapshots, &options)?;
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                Format::Sql => {
                    if !result.has_changes {
                        info!("No changes detected.");
                        return Ok(ExitCode::SUCCESS);
                    }
                    match direction {
                        Direction::Up => print!("{}", render_sql(&result.up_statements)),
                        Direction::Down => print!("{}", render_sql(&result.down_statements)),
                        Direction::Both => {
                            println!("-- up");
                            print!("{}", render_sql(&result.up_statements));
                            println!();
                            println!("-- down");
                            print!("{}", render_sql(&result.down_statements));
                        }
                    }
                }
            }
        }

        Commands::Write {
            snapshots,
            name,
            migrations_dir,
        } => {
            let result = run(&snapshots, &options)?;
            write_migration(&migrations_dir, &name, &result, Utc::now())?;
        }

        Commands::Check { snapshots } => {
            let result = run(&snapshots, &options)?;
            if result.has_changes {
                info!("{} change(s) pending.", result.changes.len());
                return Ok(ExitCode::FAILURE);
            }
            info!("Schemas are in sync.");
        }
    }

    Ok(ExitCode::SUCCESS)
}
