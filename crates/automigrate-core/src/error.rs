//! Error types for migration generation.

/// Errors raised for malformed snapshots.
///
/// Generation never partially succeeds: the first malformed element found
/// in either snapshot aborts the whole call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutogenError {
    /// Two tables in one snapshot share a name.
    #[error("Duplicate table '{table}' in snapshot")]
    DuplicateTable {
        /// The repeated table name.
        table: String,
    },

    /// Two columns in one table share a name.
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn {
        /// Owning table.
        table: String,
        /// The repeated column name.
        column: String,
    },

    /// Two indexes in one table share a name.
    #[error("Duplicate index '{index}' on table '{table}'")]
    DuplicateIndex {
        /// Owning table.
        table: String,
        /// The repeated index name.
        index: String,
    },

    /// Two foreign keys in one table share a name.
    #[error("Duplicate foreign key '{foreign_key}' on table '{table}'")]
    DuplicateForeignKey {
        /// Owning table.
        table: String,
        /// The repeated constraint name.
        foreign_key: String,
    },

    /// A foreign key points at a table that neither snapshot contains.
    #[error(
        "Foreign key '{foreign_key}' on table '{table}' references unknown table '{referenced_table}'"
    )]
    UnknownReferencedTable {
        /// Owning table.
        table: String,
        /// Constraint name.
        foreign_key: String,
        /// The missing table.
        referenced_table: String,
    },

    /// A desired foreign key references a table only the current snapshot
    /// has. It would be re-added after the table is dropped.
    #[error(
        "Foreign key '{foreign_key}' on table '{table}' references table '{referenced_table}', which is being dropped"
    )]
    ReferencesDroppedTable {
        /// Owning table.
        table: String,
        /// Constraint name.
        foreign_key: String,
        /// The dropped table.
        referenced_table: String,
    },

    /// A foreign key's local and referenced column lists differ in length.
    #[error(
        "Foreign key '{foreign_key}' on table '{table}' has {columns} column(s) but references {referenced_columns}"
    )]
    ForeignKeyArityMismatch {
        /// Owning table.
        table: String,
        /// Constraint name.
        foreign_key: String,
        /// Number of referencing columns.
        columns: usize,
        /// Number of referenced columns.
        referenced_columns: usize,
    },

    /// An index or foreign key names a column its table does not have.
    #[error("'{object}' on table '{table}' references unknown column '{column}'")]
    UnknownColumn {
        /// Owning table.
        table: String,
        /// Index or constraint name.
        object: String,
        /// The missing column.
        column: String,
    },

    /// An index or foreign key has no columns.
    #[error("'{object}' on table '{table}' has an empty column list")]
    EmptyColumnList {
        /// Owning table.
        table: String,
        /// Index or constraint name.
        object: String,
    },
}

/// Result type for migration generation.
pub type Result<T> = std::result::Result<T, AutogenError>;
