//! Structural changes between two snapshots.
//!
//! Each variant of [`Change`] is one atomic difference detected by the
//! differ. Rendering to SQL is left to a
//! [`MigrationDialect`](crate::dialect::MigrationDialect).

use serde::Serialize;

use crate::snapshot::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableDescriptor, TableRef,
};

/// A single structural change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Create a new table with its columns, primary key and indexes.
    CreateTable(CreateTableChange),
    /// Drop an existing table (always with CASCADE).
    DropTable(DropTableChange),
    /// Add a column to an existing table.
    AddColumn(ColumnChange),
    /// Drop a column, keeping its definition for the reverse.
    DropColumn(ColumnChange),
    /// Alter type, nullability or default of a column.
    AlterColumn(AlterColumnChange),
    /// Create an index.
    AddIndex(IndexChange),
    /// Drop an index, keeping its definition for the reverse.
    DropIndex(IndexChange),
    /// Add a foreign key constraint.
    AddForeignKey(ForeignKeyChange),
    /// Drop a foreign key constraint.
    DropForeignKey(ForeignKeyChange),
    /// Add a table-level primary key.
    AddPrimaryKey(PrimaryKeyChange),
    /// Drop the table-level primary key.
    DropPrimaryKey(PrimaryKeyChange),
    /// Add a single-column UNIQUE constraint.
    AddUniqueConstraint(UniqueChange),
    /// Drop a single-column UNIQUE constraint.
    DropUniqueConstraint(UniqueChange),
}

impl Change {
    /// Returns the change that undoes this one.
    ///
    /// Returns `None` for [`Change::DropTable`]: a dropped table is never
    /// reconstructed.
    #[must_use]
    pub fn reverse(&self) -> Option<Self> {
        let reversed = match self {
            Self::CreateTable(c) => Self::DropTable(DropTableChange {
                table: c.table_ref.clone(),
                dependents: vec![],
            }),
            Self::DropTable(_) => return None,
            Self::AddColumn(c) => Self::DropColumn(c.clone()),
            Self::DropColumn(c) => Self::AddColumn(c.clone()),
            Self::AlterColumn(c) => Self::AlterColumn(AlterColumnChange {
                table: c.table.clone(),
                column: c.column.clone(),
                alterations: c
                    .alterations
                    .iter()
                    .rev()
                    .map(ColumnAlteration::reverse)
                    .collect(),
            }),
            Self::AddIndex(c) => Self::DropIndex(c.clone()),
            Self::DropIndex(c) => Self::AddIndex(c.clone()),
            Self::AddForeignKey(c) => Self::DropForeignKey(c.clone()),
            Self::DropForeignKey(c) => Self::AddForeignKey(c.clone()),
            Self::AddPrimaryKey(c) => Self::DropPrimaryKey(c.clone()),
            Self::DropPrimaryKey(c) => Self::AddPrimaryKey(c.clone()),
            Self::AddUniqueConstraint(c) => Self::DropUniqueConstraint(c.clone()),
            Self::DropUniqueConstraint(c) => Self::AddUniqueConstraint(c.clone()),
        };
        Some(reversed)
    }

    /// Returns whether this change can be undone.
    #[must_use]
    pub const fn is_reversible(&self) -> bool {
        !matches!(self, Self::DropTable(_))
    }

    /// The table this change applies to.
    #[must_use]
    pub fn table(&self) -> TableRef {
        match self {
            Self::CreateTable(c) => c.table_ref.clone(),
            Self::DropTable(c) => c.table.clone(),
            Self::AddColumn(c) | Self::DropColumn(c) => c.table.clone(),
            Self::AlterColumn(c) => c.table.clone(),
            Self::AddIndex(c) | Self::DropIndex(c) => c.table.clone(),
            Self::AddForeignKey(c) | Self::DropForeignKey(c) => c.table.clone(),
            Self::AddPrimaryKey(c) | Self::DropPrimaryKey(c) => c.table.clone(),
            Self::AddUniqueConstraint(c) | Self::DropUniqueConstraint(c) => c.table.clone(),
        }
    }
}

/// Create table change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTableChange {
    /// Rendered identity of the new table.
    pub table_ref: TableRef,
    /// The full desired table. Its foreign keys are emitted separately.
    pub table: TableDescriptor,
}

impl From<CreateTableChange> for Change {
    fn from(c: CreateTableChange) -> Self {
        Self::CreateTable(c)
    }
}

/// A foreign key on a surviving table that a CASCADE drop removes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CascadeDependent {
    /// Table owning the foreign key.
    pub table: String,
    /// Constraint name.
    pub foreign_key: String,
}

/// Drop table change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropTableChange {
    /// The dropped table.
    pub table: TableRef,
    /// Foreign keys elsewhere that reference the dropped table.
    pub dependents: Vec<CascadeDependent>,
}

impl From<DropTableChange> for Change {
    fn from(c: DropTableChange) -> Self {
        Self::DropTable(c)
    }
}

/// Add or drop column change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChange {
    /// Owning table.
    pub table: TableRef,
    /// The full column definition.
    pub column: ColumnDescriptor,
}

/// One attribute of a column that differs between snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "attribute", rename_all = "snake_case")]
pub enum ColumnAlteration {
    /// The SQL type changed.
    DataType {
        /// Type in the current snapshot.
        from: String,
        /// Type in the desired snapshot.
        to: String,
    },
    /// Effective nullability changed.
    Nullable {
        /// Nullability in the current snapshot.
        from: bool,
        /// Nullability in the desired snapshot.
        to: bool,
    },
    /// The default expression was added, changed or removed.
    Default {
        /// Default in the current snapshot.
        from: Option<String>,
        /// Default in the desired snapshot.
        to: Option<String>,
    },
}

impl ColumnAlteration {
    /// Swaps `from` and `to`.
    #[must_use]
    pub fn reverse(&self) -> Self {
        match self {
            Self::DataType { from, to } => Self::DataType {
                from: to.clone(),
                to: from.clone(),
            },
            Self::Nullable { from, to } => Self::Nullable {
                from: *to,
                to: *from,
            },
            Self::Default { from, to } => Self::Default {
                from: to.clone(),
                to: from.clone(),
            },
        }
    }
}

/// Alter column change. Each alteration renders as its own statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlterColumnChange {
    /// Owning table.
    pub table: TableRef,
    /// Column name.
    pub column: String,
    /// Attribute changes, in type / nullable / default order.
    pub alterations: Vec<ColumnAlteration>,
}

impl From<AlterColumnChange> for Change {
    fn from(c: AlterColumnChange) -> Self {
        Self::AlterColumn(c)
    }
}

/// Add or drop index change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexChange {
    /// Indexed table.
    pub table: TableRef,
    /// The full index definition.
    pub index: IndexDescriptor,
}

/// Add or drop foreign key change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyChange {
    /// Owning table.
    pub table: TableRef,
    /// The full constraint definition.
    pub foreign_key: ForeignKeyDescriptor,
    /// The referenced table, resolved to its schema.
    pub referenced: TableRef,
}

/// Add or drop primary key change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryKeyChange {
    /// Owning table.
    pub table: TableRef,
    /// Key columns.
    pub columns: Vec<String>,
}

/// Add or drop UNIQUE constraint change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueChange {
    /// Owning table.
    pub table: TableRef,
    /// Constrained column.
    pub column: String,
}
