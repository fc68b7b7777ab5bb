//! Dialect-specific SQL rendering for changes.
//!
//! Different databases spell DDL differently. A dialect turns each
//! [`Change`] into one or more SQL statements; the default methods produce
//! standard SQL and implementations override what their database does
//! differently.

mod postgres;

pub use postgres::PostgresDialect;

use crate::change::{
    AlterColumnChange, Change, ColumnAlteration, ColumnChange, CreateTableChange,
    DropTableChange, ForeignKeyChange, IndexChange, PrimaryKeyChange, UniqueChange,
};
use crate::snapshot::{ColumnDescriptor, IndexDescriptor, TableRef};

/// Trait for dialect-specific SQL generation.
///
/// Type tokens, default expressions and referential actions are emitted
/// verbatim. Only identifiers are quoted.
pub trait MigrationDialect {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Renders the statements that apply a change.
    fn generate_sql(&self, change: &Change) -> Vec<String> {
        match change {
            Change::CreateTable(c) => self.create_table(c),
            Change::DropTable(c) => vec![self.drop_table(&c.table)],
            Change::AddColumn(c) => vec![self.add_column(c)],
            Change::DropColumn(c) => vec![self.drop_column(c)],
            Change::AlterColumn(c) => self.alter_column(c),
            Change::AddIndex(c) => vec![self.create_index(&c.table, &c.index)],
            Change::DropIndex(c) => vec![self.drop_index(c)],
            Change::AddForeignKey(c) => vec![self.add_foreign_key(c)],
            Change::DropForeignKey(c) => {
                vec![self.drop_constraint(&c.table, &c.foreign_key.name)]
            }
            Change::AddPrimaryKey(c) => vec![self.add_primary_key(c)],
            Change::DropPrimaryKey(c) => {
                vec![self.drop_constraint(&c.table, &self.primary_key_name(&c.table))]
            }
            Change::AddUniqueConstraint(c) => vec![self.add_unique(c)],
            Change::DropUniqueConstraint(c) => vec![self.drop_constraint(
                &c.table,
                &self.unique_constraint_name(&c.table, &c.column),
            )],
        }
    }

    /// Generates CREATE TABLE followed by the table's CREATE INDEX
    /// statements. Foreign keys are not included.
    fn create_table(&self, change: &CreateTableChange) -> Vec<String> {
        let mut defs: Vec<String> = change
            .table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();

        let pk = change.table.primary_key();
        if !pk.is_empty() {
            defs.push(format!("PRIMARY KEY ({})", self.column_list(&pk)));
        }

        let mut statements = vec![format!(
            "CREATE TABLE {} ({})",
            self.qualified_table(&change.table_ref),
            defs.join(", ")
        )];
        statements.extend(
            change
                .table
                .indexes
                .iter()
                .map(|idx| self.create_index(&change.table_ref, idx)),
        );
        statements
    }

    /// Generates DROP TABLE. Always cascades.
    fn drop_table(&self, table: &TableRef) -> String {
        format!("DROP TABLE {} CASCADE", self.qualified_table(table))
    }

    /// Generates the comment standing in for the reverse of a dropped table.
    fn irreversible_drop_table(&self, change: &DropTableChange) -> Vec<String> {
        let mut lines = vec![format!(
            "-- Cannot auto-generate CREATE TABLE for {}",
            self.qualified_table(&change.table)
        )];
        if !change.dependents.is_empty() {
            let removed: Vec<String> = change
                .dependents
                .iter()
                .map(|d| {
                    format!(
                        "{}.{}",
                        self.quote_identifier(&d.table),
                        self.quote_identifier(&d.foreign_key)
                    )
                })
                .collect();
            lines.push(format!(
                "-- Foreign keys removed by CASCADE: {}",
                removed.join(", ")
            ));
        }
        lines
    }

    /// Generates ADD COLUMN.
    fn add_column(&self, change: &ColumnChange) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.qualified_table(&change.table),
            self.column_definition(&change.column)
        )
    }

    /// Generates DROP COLUMN.
    fn drop_column(&self, change: &ColumnChange) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.qualified_table(&change.table),
            self.quote_identifier(&change.column.name)
        )
    }

    /// Generates one statement per alteration, in order.
    fn alter_column(&self, change: &AlterColumnChange) -> Vec<String> {
        change
            .alterations
            .iter()
            .map(|a| self.alter_column_clause(&change.table, &change.column, a))
            .collect()
    }

    /// Generates a single ALTER COLUMN statement.
    fn alter_column_clause(
        &self,
        table: &TableRef,
        column: &str,
        alteration: &ColumnAlteration,
    ) -> String;

    /// Generates CREATE INDEX.
    fn create_index(&self, table: &TableRef, index: &IndexDescriptor) -> String {
        let mut sql = String::from("CREATE ");
        if index.is_unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        sql.push_str(&self.quote_identifier(&index.name));
        sql.push_str(" ON ");
        sql.push_str(&self.qualified_table(table));
        if !index.index_type.trim().is_empty() {
            sql.push_str(" USING ");
            sql.push_str(index.index_type.trim());
        }
        sql.push_str(" (");
        sql.push_str(&self.column_list(&index.columns));
        sql.push(')');
        sql
    }

    /// Generates DROP INDEX.
    fn drop_index(&self, change: &IndexChange) -> String;

    /// Generates ADD CONSTRAINT ... FOREIGN KEY.
    fn add_foreign_key(&self, change: &ForeignKeyChange) -> String {
        let fk = &change.foreign_key;
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.qualified_table(&change.table),
            self.quote_identifier(&fk.name),
            self.column_list(&fk.columns),
            self.qualified_table(&change.referenced),
            self.column_list(&fk.referenced_columns),
        );
        if !fk.on_delete.trim().is_empty() {
            sql.push_str(" ON DELETE ");
            sql.push_str(fk.on_delete.trim());
        }
        if !fk.on_update.trim().is_empty() {
            sql.push_str(" ON UPDATE ");
            sql.push_str(fk.on_update.trim());
        }
        sql
    }

    /// Generates ADD PRIMARY KEY.
    fn add_primary_key(&self, change: &PrimaryKeyChange) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            self.qualified_table(&change.table),
            self.quote_identifier(&self.primary_key_name(&change.table)),
            self.column_list(&change.columns)
        )
    }

    /// Generates ADD CONSTRAINT ... UNIQUE.
    fn add_unique(&self, change: &UniqueChange) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
            self.qualified_table(&change.table),
            self.quote_identifier(&self.unique_constraint_name(&change.table, &change.column)),
            self.quote_identifier(&change.column)
        )
    }

    /// Generates DROP CONSTRAINT.
    fn drop_constraint(&self, table: &TableRef, name: &str) -> String;

    /// Name of the table-level primary key constraint.
    fn primary_key_name(&self, table: &TableRef) -> String {
        format!("{}_pkey", table.name)
    }

    /// Name of a single-column UNIQUE constraint.
    fn unique_constraint_name(&self, table: &TableRef, column: &str) -> String {
        format!("{}_{}_key", table.name, column)
    }

    /// Generates a column definition. Primary keys are rendered at table
    /// level, never inline.
    fn column_definition(&self, col: &ColumnDescriptor) -> String {
        let mut sql = format!("{} {}", self.quote_identifier(&col.name), col.data_type.trim());
        if !col.effective_nullable() {
            sql.push_str(" NOT NULL");
        }
        if col.is_unique && !col.is_primary_key {
            sql.push_str(" UNIQUE");
        }
        if let Some(ref default) = col.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default.trim());
        }
        sql
    }

    /// Returns the identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling any embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Quotes a table name, qualifying it when it has a schema.
    fn qualified_table(&self, table: &TableRef) -> String {
        if table.schema.is_empty() {
            self.quote_identifier(&table.name)
        } else {
            format!(
                "{}.{}",
                self.quote_identifier(&table.schema),
                self.quote_identifier(&table.name)
            )
        }
    }

    /// Quotes and joins a column list.
    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
