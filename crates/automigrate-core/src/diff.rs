//! Schema diff engine.
//!
//! Compares a "current" (live database) and "desired" (declared models)
//! [`Snapshot`] and produces the ordered list of [`Change`]s needed to
//! migrate from one to the other.
//!
//! Ordering across tables: dropped tables first, then every dropped foreign
//! key, then the remaining alterations of tables present in both, then
//! created tables, then every added foreign key. Inside one table: drop
//! indexes and key constraints, drop columns, alter columns, add columns,
//! add indexes and key constraints.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::change::{
    AlterColumnChange, CascadeDependent, Change, ColumnAlteration, ColumnChange,
    CreateTableChange, DropTableChange, ForeignKeyChange, IndexChange, PrimaryKeyChange,
    UniqueChange,
};
use crate::error::Result;
use crate::normalize::{defaults_equivalent, similarity, types_equivalent};
use crate::options::AutogenOptions;
use crate::snapshot::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, Snapshot, TableDescriptor, TableRef,
};
use crate::validate::validate_pair;

/// Advisory findings that never turn into SQL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffWarning {
    /// A dropped and an added column with equivalent types and similar
    /// names. Emitted as drop + add; applying it loses the column data.
    PossibleColumnRename {
        /// Table containing the columns.
        table: String,
        /// The column that was dropped.
        old_column: String,
        /// The column that was added.
        new_column: String,
        /// Name similarity score (0.0 to 1.0).
        similarity: f64,
    },
    /// A dropped and an added table with the same column structure.
    PossibleTableRename {
        /// The table that was dropped.
        old_table: String,
        /// The table that was added.
        new_table: String,
        /// Name similarity score (0.0 to 1.0).
        similarity: f64,
    },
    /// The relative order of surviving columns changed. Columns cannot be
    /// reordered in place, so no SQL is generated for it.
    ColumnOrderChanged {
        /// Table name.
        table: String,
        /// Column names in the current order.
        old_order: Vec<String>,
        /// Column names in the desired order.
        new_order: Vec<String>,
    },
    /// A table kept its name but moved to another schema. Alterations are
    /// rendered against the desired schema.
    SchemaChanged {
        /// Table name.
        table: String,
        /// Schema in the current snapshot.
        from: String,
        /// Schema in the desired snapshot.
        to: String,
    },
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    /// Changes in application order.
    pub changes: Vec<Change>,
    /// Advisory warnings.
    pub warnings: Vec<DiffWarning>,
}

impl ChangeSet {
    /// Returns `true` if there are no structural changes. Warnings do not
    /// count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of structural changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if every change can be reversed.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.changes.iter().all(Change::is_reversible)
    }

    /// Returns references to the changes that cannot be reversed.
    #[must_use]
    pub fn non_reversible_changes(&self) -> Vec<&Change> {
        self.changes.iter().filter(|c| !c.is_reversible()).collect()
    }
}

/// Compares snapshots by name and produces a [`ChangeSet`].
#[derive(Debug, Clone, Default)]
pub struct SchemaDiffer {
    options: AutogenOptions,
}

/// Changes for one table present in both snapshots. Foreign key changes
/// are kept apart: drops run before any table is altered, adds after every
/// table is created.
struct TableChanges {
    drop_foreign_keys: Vec<Change>,
    leading: Vec<Change>,
    add_foreign_keys: Vec<Change>,
}

impl TableChanges {
    fn len(&self) -> usize {
        self.drop_foreign_keys.len() + self.leading.len() + self.add_foreign_keys.len()
    }
}

impl SchemaDiffer {
    /// Creates a differ with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a differ with custom options.
    #[must_use]
    pub const fn with_options(options: AutogenOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub const fn options(&self) -> &AutogenOptions {
        &self.options
    }

    /// Compares `current` against `desired`.
    ///
    /// # Errors
    ///
    /// Returns an error if either snapshot is malformed; see
    /// [`AutogenError`](crate::AutogenError).
    pub fn diff(&self, current: &Snapshot, desired: &Snapshot) -> Result<ChangeSet> {
        validate_pair(current, desired)?;

        let current_names: HashSet<&str> =
            current.tables().iter().map(|t| t.name.as_str()).collect();
        let desired_names: HashSet<&str> =
            desired.tables().iter().map(|t| t.name.as_str()).collect();

        let dropped: Vec<&TableDescriptor> = current
            .tables()
            .iter()
            .filter(|t| !desired_names.contains(t.name.as_str()))
            .collect();
        let added: Vec<&TableDescriptor> = desired
            .tables()
            .iter()
            .filter(|t| !current_names.contains(t.name.as_str()))
            .collect();
        let dropped_names: HashSet<&str> = dropped.iter().map(|t| t.name.as_str()).collect();

        let mut warnings = Vec::new();
        if self.options.detect_renames {
            self.detect_table_renames(&dropped, &added, &mut warnings);
        }

        // ---- Dropped tables ---------------------------------------
        let mut drop_ops = Vec::new();
        let mut cascaded: HashSet<(String, String)> = HashSet::new();
        for table in &dropped {
            let dependents = cascade_dependents(table, current, &dropped_names);
            for d in &dependents {
                cascaded.insert((d.table.clone(), d.foreign_key.clone()));
            }
            debug!(
                table = %table.name,
                dependents = dependents.len(),
                "table dropped"
            );
            drop_ops.push(Change::DropTable(DropTableChange {
                table: self.table_ref(table),
                dependents,
            }));
        }

        // ---- Tables in both snapshots ------------------------------
        let mut drop_fk_ops = Vec::new();
        let mut alter_ops = Vec::new();
        let mut late_fk_ops = Vec::new();
        for new in desired.tables() {
            let Some(old) = current.table(&new.name) else {
                continue;
            };
            let table_changes = self.diff_table(old, new, current, desired, &cascaded, &mut warnings);
            if table_changes.len() > 0 {
                debug!(table = %new.name, changes = table_changes.len(), "table altered");
            }
            drop_fk_ops.extend(table_changes.drop_foreign_keys);
            alter_ops.extend(table_changes.leading);
            late_fk_ops.extend(table_changes.add_foreign_keys);
        }

        // ---- New tables ---------------------------------------------
        let mut create_ops = Vec::new();
        let mut created_fk_ops = Vec::new();
        for table in &added {
            debug!(table = %table.name, columns = table.columns.len(), "table created");
            let table_ref = self.table_ref(table);
            for fk in &table.foreign_keys {
                created_fk_ops.push(Change::AddForeignKey(ForeignKeyChange {
                    table: table_ref.clone(),
                    foreign_key: fk.clone(),
                    referenced: self.resolve_referenced(fk, desired, current, table),
                }));
            }
            create_ops.push(Change::CreateTable(CreateTableChange {
                table_ref,
                table: (*table).clone(),
            }));
        }

        let mut changes = drop_ops;
        changes.extend(drop_fk_ops);
        changes.extend(alter_ops);
        changes.extend(create_ops);
        changes.extend(late_fk_ops);
        changes.extend(created_fk_ops);

        for warning in &warnings {
            warn!(?warning, "schema diff warning");
        }

        Ok(ChangeSet { changes, warnings })
    }

    /// Diffs a single table present in both snapshots.
    fn diff_table(
        &self,
        old: &TableDescriptor,
        new: &TableDescriptor,
        current: &Snapshot,
        desired: &Snapshot,
        cascaded: &HashSet<(String, String)>,
        warnings: &mut Vec<DiffWarning>,
    ) -> TableChanges {
        let table = self.table_ref(new);
        let mut drop_foreign_keys = Vec::new();
        let mut leading = Vec::new();
        let mut add_foreign_keys = Vec::new();

        if self.options.qualifier(&old.schema) != self.options.qualifier(&new.schema) {
            warnings.push(DiffWarning::SchemaChanged {
                table: new.name.clone(),
                from: old.schema.clone(),
                to: new.schema.clone(),
            });
        }

        // ---- Drop foreign keys ---------------------------------------
        for fk in &old.foreign_keys {
            let unchanged = new
                .get_foreign_key(&fk.name)
                .is_some_and(|n| fks_equivalent(fk, n));
            let removed_by_cascade = cascaded.contains(&(old.name.clone(), fk.name.clone()));
            if !unchanged && !removed_by_cascade {
                drop_foreign_keys.push(Change::DropForeignKey(ForeignKeyChange {
                    table: table.clone(),
                    foreign_key: fk.clone(),
                    referenced: self.resolve_referenced(fk, current, desired, old),
                }));
            }
        }

        // ---- Drop indexes and key constraints -------------------------
        for idx in &old.indexes {
            let unchanged = new
                .get_index(&idx.name)
                .is_some_and(|n| indexes_equivalent(idx, n));
            if !unchanged {
                leading.push(Change::DropIndex(IndexChange {
                    table: table.clone(),
                    index: idx.clone(),
                }));
            }
        }

        let old_pk = old.primary_key();
        let new_pk = new.primary_key();
        let pk_changed = as_set(&old_pk) != as_set(&new_pk);
        if pk_changed && !old_pk.is_empty() {
            leading.push(Change::DropPrimaryKey(PrimaryKeyChange {
                table: table.clone(),
                columns: old_pk,
            }));
        }

        for old_col in &old.columns {
            let Some(new_col) = new.get_column(&old_col.name) else {
                continue;
            };
            if effective_unique(old_col)
                && !effective_unique(new_col)
                && !has_unique_index(old, &old_col.name)
            {
                leading.push(Change::DropUniqueConstraint(UniqueChange {
                    table: table.clone(),
                    column: old_col.name.clone(),
                }));
            }
        }

        // ---- Drop columns -------------------------------------------
        let mut dropped_columns = Vec::new();
        for old_col in &old.columns {
            if new.get_column(&old_col.name).is_none() {
                dropped_columns.push(old_col);
                leading.push(Change::DropColumn(ColumnChange {
                    table: table.clone(),
                    column: old_col.clone(),
                }));
            }
        }

        // ---- Alter columns ------------------------------------------
        for new_col in &new.columns {
            let Some(old_col) = old.get_column(&new_col.name) else {
                continue;
            };
            let alterations = column_alterations(old_col, new_col);
            if !alterations.is_empty() {
                leading.push(Change::AlterColumn(AlterColumnChange {
                    table: table.clone(),
                    column: new_col.name.clone(),
                    alterations,
                }));
            }
        }

        // ---- Add columns --------------------------------------------
        let mut added_columns = Vec::new();
        for new_col in &new.columns {
            if old.get_column(&new_col.name).is_none() {
                added_columns.push(new_col);
                leading.push(Change::AddColumn(ColumnChange {
                    table: table.clone(),
                    column: new_col.clone(),
                }));
            }
        }

        // ---- Add indexes and key constraints --------------------------
        for idx in &new.indexes {
            let unchanged = old
                .get_index(&idx.name)
                .is_some_and(|o| indexes_equivalent(o, idx));
            if !unchanged {
                leading.push(Change::AddIndex(IndexChange {
                    table: table.clone(),
                    index: idx.clone(),
                }));
            }
        }

        if pk_changed && !new_pk.is_empty() {
            leading.push(Change::AddPrimaryKey(PrimaryKeyChange {
                table: table.clone(),
                columns: new_pk,
            }));
        }

        for new_col in &new.columns {
            let Some(old_col) = old.get_column(&new_col.name) else {
                continue;
            };
            if effective_unique(new_col)
                && !effective_unique(old_col)
                && !has_unique_index(new, &new_col.name)
            {
                leading.push(Change::AddUniqueConstraint(UniqueChange {
                    table: table.clone(),
                    column: new_col.name.clone(),
                }));
            }
        }

        // ---- Add foreign keys ---------------------------------------
        for fk in &new.foreign_keys {
            let unchanged = old
                .get_foreign_key(&fk.name)
                .is_some_and(|o| fks_equivalent(o, fk));
            if !unchanged {
                add_foreign_keys.push(Change::AddForeignKey(ForeignKeyChange {
                    table: table.clone(),
                    foreign_key: fk.clone(),
                    referenced: self.resolve_referenced(fk, desired, current, new),
                }));
            }
        }

        if self.options.detect_renames {
            self.detect_column_renames(&new.name, &dropped_columns, &added_columns, warnings);
        }
        detect_column_order_change(old, new, warnings);

        TableChanges {
            drop_foreign_keys,
            leading,
            add_foreign_keys,
        }
    }

    /// Builds the rendered identity of a table.
    fn table_ref(&self, table: &TableDescriptor) -> TableRef {
        TableRef::new(
            self.options.qualifier(&table.schema).unwrap_or_default(),
            &table.name,
        )
    }

    /// Resolves the table a foreign key points at, preferring `primary`
    /// and falling back to the owning table's schema.
    fn resolve_referenced(
        &self,
        fk: &ForeignKeyDescriptor,
        primary: &Snapshot,
        fallback: &Snapshot,
        owner: &TableDescriptor,
    ) -> TableRef {
        primary
            .table(&fk.referenced_table)
            .or_else(|| fallback.table(&fk.referenced_table))
            .map_or_else(
                || {
                    TableRef::new(
                        self.options.qualifier(&owner.schema).unwrap_or_default(),
                        &fk.referenced_table,
                    )
                },
                |t| self.table_ref(t),
            )
    }

    /// Reports dropped/added column pairs that look like renames. Greedy
    /// matching, highest similarity first.
    fn detect_column_renames(
        &self,
        table: &str,
        dropped: &[&ColumnDescriptor],
        added: &[&ColumnDescriptor],
        warnings: &mut Vec<DiffWarning>,
    ) {
        let mut candidates: Vec<(&str, &str, f64)> = Vec::new();
        for d in dropped {
            for a in added {
                if types_equivalent(&d.data_type, &a.data_type) {
                    let sim = similarity(&d.name, &a.name);
                    if sim >= self.options.rename_threshold {
                        candidates.push((d.name.as_str(), a.name.as_str(), sim));
                    }
                }
            }
        }
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut used_dropped = BTreeSet::new();
        let mut used_added = BTreeSet::new();
        for (d, a, sim) in candidates {
            if used_dropped.contains(d) || used_added.contains(a) {
                continue;
            }
            used_dropped.insert(d);
            used_added.insert(a);
            warnings.push(DiffWarning::PossibleColumnRename {
                table: table.to_string(),
                old_column: d.to_string(),
                new_column: a.to_string(),
                similarity: sim,
            });
        }
    }

    /// Reports dropped/added table pairs with identical column structure.
    fn detect_table_renames(
        &self,
        dropped: &[&TableDescriptor],
        added: &[&TableDescriptor],
        warnings: &mut Vec<DiffWarning>,
    ) {
        let mut candidates: Vec<(&str, &str, f64)> = Vec::new();
        for d in dropped {
            for a in added {
                if tables_have_same_columns(d, a) {
                    candidates.push((d.name.as_str(), a.name.as_str(), similarity(&d.name, &a.name)));
                }
            }
        }
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut used_dropped = BTreeSet::new();
        let mut used_added = BTreeSet::new();
        for (d, a, sim) in candidates {
            if used_dropped.contains(d) || used_added.contains(a) {
                continue;
            }
            used_dropped.insert(d);
            used_added.insert(a);
            warnings.push(DiffWarning::PossibleTableRename {
                old_table: d.to_string(),
                new_table: a.to_string(),
                similarity: sim,
            });
        }
    }
}

// ================================================================
// Helpers
// ================================================================

/// Foreign keys on surviving tables of `current` that reference `dropped`.
fn cascade_dependents(
    dropped: &TableDescriptor,
    current: &Snapshot,
    dropped_names: &HashSet<&str>,
) -> Vec<CascadeDependent> {
    let mut dependents: Vec<CascadeDependent> = current
        .tables()
        .iter()
        .filter(|t| !dropped_names.contains(t.name.as_str()))
        .flat_map(|t| {
            t.foreign_keys
                .iter()
                .filter(|fk| fk.referenced_table == dropped.name)
                .map(|fk| CascadeDependent {
                    table: t.name.clone(),
                    foreign_key: fk.name.clone(),
                })
        })
        .collect();
    dependents.sort();
    dependents
}

/// Type, nullability and default changes, each tracked independently.
fn column_alterations(old: &ColumnDescriptor, new: &ColumnDescriptor) -> Vec<ColumnAlteration> {
    let mut alterations = Vec::new();

    if !types_equivalent(&old.data_type, &new.data_type) {
        alterations.push(ColumnAlteration::DataType {
            from: old.data_type.clone(),
            to: new.data_type.clone(),
        });
    }

    if old.effective_nullable() != new.effective_nullable() {
        alterations.push(ColumnAlteration::Nullable {
            from: old.effective_nullable(),
            to: new.effective_nullable(),
        });
    }

    if !defaults_equivalent(old.default.as_deref(), new.default.as_deref()) {
        alterations.push(ColumnAlteration::Default {
            from: old.default.clone(),
            to: new.default.clone(),
        });
    }

    alterations
}

/// UNIQUE as rendered: a primary key column never carries its own
/// UNIQUE constraint.
const fn effective_unique(col: &ColumnDescriptor) -> bool {
    col.is_unique && !col.is_primary_key
}

fn has_unique_index(table: &TableDescriptor, column: &str) -> bool {
    table.indexes.iter().any(|i| i.is_unique_on(column))
}

fn as_set(columns: &[String]) -> BTreeSet<&str> {
    columns.iter().map(String::as_str).collect()
}

/// Indexes with the same name are unchanged only if every attribute
/// matches.
fn indexes_equivalent(a: &IndexDescriptor, b: &IndexDescriptor) -> bool {
    a.columns == b.columns
        && a.is_unique == b.is_unique
        && a.index_type.trim().eq_ignore_ascii_case(b.index_type.trim())
}

fn fks_equivalent(a: &ForeignKeyDescriptor, b: &ForeignKeyDescriptor) -> bool {
    a.columns == b.columns
        && a.referenced_table == b.referenced_table
        && a.referenced_columns == b.referenced_columns
        && a.on_delete.trim().eq_ignore_ascii_case(b.on_delete.trim())
        && a.on_update.trim().eq_ignore_ascii_case(b.on_update.trim())
}

/// Returns `true` if two tables have identical column structure.
fn tables_have_same_columns(a: &TableDescriptor, b: &TableDescriptor) -> bool {
    a.columns.len() == b.columns.len()
        && a.columns.iter().zip(&b.columns).all(|(ac, bc)| {
            ac.name == bc.name
                && types_equivalent(&ac.data_type, &bc.data_type)
                && ac.effective_nullable() == bc.effective_nullable()
                && ac.is_primary_key == bc.is_primary_key
                && ac.is_unique == bc.is_unique
                && defaults_equivalent(ac.default.as_deref(), bc.default.as_deref())
        })
}

/// Detects whether the relative order of surviving columns changed.
fn detect_column_order_change(
    old: &TableDescriptor,
    new: &TableDescriptor,
    warnings: &mut Vec<DiffWarning>,
) {
    let old_order: Vec<String> = old
        .columns
        .iter()
        .filter(|c| new.get_column(&c.name).is_some())
        .map(|c| c.name.clone())
        .collect();
    let new_order: Vec<String> = new
        .columns
        .iter()
        .filter(|c| old.get_column(&c.name).is_some())
        .map(|c| c.name.clone())
        .collect();

    if old_order != new_order {
        warnings.push(DiffWarning::ColumnOrderChanged {
            table: new.name.clone(),
            old_order,
            new_order,
        });
    }
}
