//! PostgreSQL dialect for migrations.

use super::MigrationDialect;
use crate::change::{ColumnAlteration, IndexChange};
use crate::snapshot::TableRef;

/// PostgreSQL dialect for migration SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MigrationDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn alter_column_clause(
        &self,
        table: &TableRef,
        column: &str,
        alteration: &ColumnAlteration,
    ) -> String {
        let table = self.qualified_table(table);
        let column = self.quote_identifier(column);

        match alteration {
            ColumnAlteration::DataType { to, .. } => {
                format!("ALTER TABLE {table} ALTER COLUMN {column} TYPE {}", to.trim())
            }
            ColumnAlteration::Nullable { to: true, .. } => {
                format!("ALTER TABLE {table} ALTER COLUMN {column} DROP NOT NULL")
            }
            ColumnAlteration::Nullable { to: false, .. } => {
                format!("ALTER TABLE {table} ALTER COLUMN {column} SET NOT NULL")
            }
            ColumnAlteration::Default { to: Some(expr), .. } => {
                format!(
                    "ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT {}",
                    expr.trim()
                )
            }
            ColumnAlteration::Default { to: None, .. } => {
                format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT")
            }
        }
    }

    fn drop_index(&self, change: &IndexChange) -> String {
        // Indexes live in their table's schema.
        let name = if change.table.schema.is_empty() {
            self.quote_identifier(&change.index.name)
        } else {
            format!(
                "{}.{}",
                self.quote_identifier(&change.table.schema),
                self.quote_identifier(&change.index.name)
            )
        };
        format!("DROP INDEX {name}")
    }

    fn drop_constraint(&self, table: &TableRef, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.qualified_table(table),
            self.quote_identifier(name)
        )
    }
}
