//! # automigrate-core
//!
//! Generates up/down migration SQL by diffing two schema snapshots.
//!
//! The pipeline has two stages:
//!
//! - **Diff** - [`SchemaDiffer`] compares a *current* and a *desired*
//!   [`Snapshot`] by table, column, index and foreign key name and yields
//!   an ordered list of [`Change`]s.
//! - **Generate** - [`DdlGenerator`] renders every change through a
//!   [`MigrationDialect`] into forward (`up`) statements, and renders the
//!   reversed changes in reverse order into backward (`down`) statements.
//!
//! Everything is a pure computation over the two inputs: no I/O and no
//! shared state.
//!
//! # Example
//!
//! ```rust
//! use automigrate_core::prelude::*;
//!
//! let current = Snapshot::new().with_table(
//!     TableDescriptor::new("users")
//!         .column(ColumnDescriptor::new("id", "SERIAL").primary_key()),
//! );
//! let desired = Snapshot::new().with_table(
//!     TableDescriptor::new("users")
//!         .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
//!         .column(ColumnDescriptor::new("name", "TEXT")),
//! );
//!
//! let result = autogenerate_migration(&current, &desired).unwrap();
//! assert!(result.has_changes);
//! assert_eq!(result.up, "ALTER TABLE \"users\" ADD COLUMN \"name\" TEXT");
//! assert_eq!(result.down, "ALTER TABLE \"users\" DROP COLUMN \"name\"");
//! ```

pub mod change;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod generate;
pub mod normalize;
pub mod options;
pub mod snapshot;
pub mod validate;

pub use change::{Change, ColumnAlteration};
pub use dialect::{MigrationDialect, PostgresDialect};
pub use diff::{ChangeSet, DiffWarning, SchemaDiffer};
pub use error::{AutogenError, Result};
pub use generate::{DdlGenerator, MigrationResult};
pub use options::AutogenOptions;
pub use snapshot::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, Snapshot, TableDescriptor, TableRef,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::change::{Change, ColumnAlteration};
    pub use crate::dialect::{MigrationDialect, PostgresDialect};
    pub use crate::diff::{ChangeSet, DiffWarning, SchemaDiffer};
    pub use crate::error::{AutogenError, Result};
    pub use crate::generate::{DdlGenerator, MigrationResult};
    pub use crate::options::AutogenOptions;
    pub use crate::snapshot::{
        ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, Snapshot, TableDescriptor,
    };
    pub use crate::{autogenerate_migration, autogenerate_migration_with};
}

/// Diffs `current` against `desired` and renders PostgreSQL up/down SQL
/// with default options.
///
/// # Errors
///
/// Returns an error if either snapshot is malformed: duplicate names, a
/// foreign key referencing a table absent from both snapshots, or an index
/// or foreign key over unknown or no columns.
pub fn autogenerate_migration(current: &Snapshot, desired: &Snapshot) -> Result<MigrationResult> {
    autogenerate_migration_with(
        current,
        desired,
        &AutogenOptions::default(),
        &PostgresDialect::new(),
    )
}

/// Like [`autogenerate_migration`], with explicit options and dialect.
///
/// # Errors
///
/// Same as [`autogenerate_migration`]. Nothing is rendered for invalid
/// input.
pub fn autogenerate_migration_with<D>(
    current: &Snapshot,
    desired: &Snapshot,
    options: &AutogenOptions,
    dialect: &D,
) -> Result<MigrationResult>
where
    D: MigrationDialect + Clone,
{
    let set = SchemaDiffer::with_options(options.clone()).diff(current, desired)?;
    let generator = DdlGenerator::new(dialect.clone());
    Ok(MigrationResult::from_changes(&generator, set))
}
