//! Up/down SQL generation from a [`ChangeSet`].

use serde::Serialize;
use tracing::{info, warn};

use crate::change::Change;
use crate::dialect::MigrationDialect;
use crate::diff::{ChangeSet, DiffWarning};

/// Renders a [`ChangeSet`] into forward and backward statement lists.
#[derive(Debug, Clone, Default)]
pub struct DdlGenerator<D> {
    dialect: D,
}

impl<D: MigrationDialect> DdlGenerator<D> {
    /// Creates a generator for the given dialect.
    #[must_use]
    pub const fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the dialect in use.
    #[must_use]
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Renders `up` in change order and `down` from the reversed changes
    /// in reverse order. A dropped table contributes a comment to `down`.
    #[must_use]
    pub fn generate(&self, changes: &ChangeSet) -> (Vec<String>, Vec<String>) {
        let up: Vec<String> = changes
            .changes
            .iter()
            .flat_map(|c| self.dialect.generate_sql(c))
            .collect();

        let mut down = Vec::new();
        for change in changes.changes.iter().rev() {
            match (change.reverse(), change) {
                (Some(reversed), _) => down.extend(self.dialect.generate_sql(&reversed)),
                (None, Change::DropTable(drop)) => {
                    warn!(
                        table = %drop.table.name,
                        "dropped table cannot be recreated by the down migration"
                    );
                    down.extend(self.dialect.irreversible_drop_table(drop));
                }
                (None, _) => {}
            }
        }

        (up, down)
    }
}

/// Output of a migration generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationResult {
    /// `true` iff at least one structural change was found.
    pub has_changes: bool,
    /// Forward statements joined by newlines; empty without changes.
    pub up: String,
    /// Backward statements joined by newlines; empty without changes.
    pub down: String,
    /// Forward statements, one entry per statement or comment line.
    pub up_statements: Vec<String>,
    /// Backward statements, one entry per statement or comment line.
    pub down_statements: Vec<String>,
    /// The changes the statements were rendered from.
    pub changes: Vec<Change>,
    /// Advisory findings. They never affect `has_changes`.
    pub warnings: Vec<DiffWarning>,
}

impl MigrationResult {
    /// Renders a change set with the given generator.
    #[must_use]
    pub fn from_changes<D: MigrationDialect>(generator: &DdlGenerator<D>, set: ChangeSet) -> Self {
        let (up_statements, down_statements) = generator.generate(&set);
        info!(
            dialect = generator.dialect().name(),
            changes = set.changes.len(),
            up = up_statements.len(),
            down = down_statements.len(),
            "migration generated"
        );
        Self {
            has_changes: !set.is_empty(),
            up: up_statements.join("\n"),
            down: down_statements.join("\n"),
            up_statements,
            down_statements,
            changes: set.changes,
            warnings: set.warnings,
        }
    }
}
