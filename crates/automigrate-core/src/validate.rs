//! Structural validation of snapshots before diffing.

use std::collections::HashSet;

use crate::error::{AutogenError, Result};
use crate::snapshot::{Snapshot, TableDescriptor};

/// Checks both snapshots for malformed input.
///
/// Names must be unique per snapshot (tables) and per table (columns,
/// indexes, foreign keys). Every foreign key must reference a table found
/// in at least one of the two snapshots, and a desired foreign key must
/// not reference a table the desired snapshot drops.
pub fn validate_pair(current: &Snapshot, desired: &Snapshot) -> Result<()> {
    let known: HashSet<&str> = current
        .tables()
        .iter()
        .chain(desired.tables())
        .map(|t| t.name.as_str())
        .collect();
    let kept: HashSet<&str> = desired.tables().iter().map(|t| t.name.as_str()).collect();

    validate_snapshot(current, &known, None)?;
    validate_snapshot(desired, &known, Some(&kept))
}

fn validate_snapshot(
    snapshot: &Snapshot,
    known_tables: &HashSet<&str>,
    kept_tables: Option<&HashSet<&str>>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for table in snapshot.tables() {
        if !seen.insert(table.name.as_str()) {
            return Err(AutogenError::DuplicateTable {
                table: table.name.clone(),
            });
        }
        validate_table(table, known_tables, kept_tables)?;
    }
    Ok(())
}

fn validate_table(
    table: &TableDescriptor,
    known_tables: &HashSet<&str>,
    kept_tables: Option<&HashSet<&str>>,
) -> Result<()> {
    let mut columns = HashSet::new();
    for column in &table.columns {
        if !columns.insert(column.name.as_str()) {
            return Err(AutogenError::DuplicateColumn {
                table: table.name.clone(),
                column: column.name.clone(),
            });
        }
    }

    let mut indexes = HashSet::new();
    for index in &table.indexes {
        if !indexes.insert(index.name.as_str()) {
            return Err(AutogenError::DuplicateIndex {
                table: table.name.clone(),
                index: index.name.clone(),
            });
        }
        check_columns(table, &index.name, &index.columns, &columns)?;
    }

    let mut fks = HashSet::new();
    for fk in &table.foreign_keys {
        if !fks.insert(fk.name.as_str()) {
            return Err(AutogenError::DuplicateForeignKey {
                table: table.name.clone(),
                foreign_key: fk.name.clone(),
            });
        }
        check_columns(table, &fk.name, &fk.columns, &columns)?;
        if fk.referenced_columns.is_empty() {
            return Err(AutogenError::EmptyColumnList {
                table: table.name.clone(),
                object: fk.name.clone(),
            });
        }
        if fk.columns.len() != fk.referenced_columns.len() {
            return Err(AutogenError::ForeignKeyArityMismatch {
                table: table.name.clone(),
                foreign_key: fk.name.clone(),
                columns: fk.columns.len(),
                referenced_columns: fk.referenced_columns.len(),
            });
        }
        if !known_tables.contains(fk.referenced_table.as_str()) {
            return Err(AutogenError::UnknownReferencedTable {
                table: table.name.clone(),
                foreign_key: fk.name.clone(),
                referenced_table: fk.referenced_table.clone(),
            });
        }
        if kept_tables.is_some_and(|kept| !kept.contains(fk.referenced_table.as_str())) {
            return Err(AutogenError::ReferencesDroppedTable {
                table: table.name.clone(),
                foreign_key: fk.name.clone(),
                referenced_table: fk.referenced_table.clone(),
            });
        }
    }

    Ok(())
}

fn check_columns(
    table: &TableDescriptor,
    object: &str,
    referenced: &[String],
    columns: &HashSet<&str>,
) -> Result<()> {
    if referenced.is_empty() {
        return Err(AutogenError::EmptyColumnList {
            table: table.name.clone(),
            object: object.to_string(),
        });
    }
    match referenced.iter().find(|c| !columns.contains(c.as_str())) {
        Some(missing) => Err(AutogenError::UnknownColumn {
            table: table.name.clone(),
            object: object.to_string(),
            column: missing.clone(),
        }),
        None => Ok(()),
    }
}
