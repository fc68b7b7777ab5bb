//! Schema snapshot types.
//!
//! A [`Snapshot`] is plain data describing a schema at one point in time:
//! either what the live database currently looks like or what the declared
//! models want it to look like. Descriptors carry raw SQL fragments (type
//! tokens, default expressions, referential actions) that are rendered
//! verbatim; only identifiers are quoted by the generator.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_index_type() -> String {
    "btree".to_string()
}

fn default_fk_action() -> String {
    "NO ACTION".to_string()
}

/// A snapshot of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Raw SQL type token, e.g. `VARCHAR(255)` or `SERIAL`.
    pub data_type: String,
    /// Whether the column allows NULL values.
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Raw SQL default expression, already quoted by the caller.
    #[serde(default)]
    pub default: Option<String>,
    /// Whether this column is part of the primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Whether this column carries a UNIQUE constraint.
    #[serde(default)]
    pub is_unique: bool,
}

impl ColumnDescriptor {
    /// Creates a nullable column with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
            is_primary_key: false,
            is_unique: false,
        }
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Sets the raw default expression.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Nullability as rendered: primary key columns are never nullable.
    #[must_use]
    pub const fn effective_nullable(&self) -> bool {
        self.nullable && !self.is_primary_key
    }
}

/// A snapshot of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,
    /// Indexed columns, in key order.
    pub columns: Vec<String>,
    /// Whether this is a UNIQUE index.
    #[serde(default)]
    pub is_unique: bool,
    /// Access method, e.g. `btree` or `gin`.
    #[serde(default = "default_index_type")]
    pub index_type: String,
}

impl IndexDescriptor {
    /// Creates a non-unique btree index.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            is_unique: false,
            index_type: default_index_type(),
        }
    }

    /// Marks the index as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Sets the access method.
    #[must_use]
    pub fn using(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = index_type.into();
        self
    }

    /// Whether this is a unique index over exactly `column`.
    #[must_use]
    pub fn is_unique_on(&self, column: &str) -> bool {
        self.is_unique && self.columns.len() == 1 && self.columns[0] == column
    }
}

/// A snapshot of a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    /// Constraint name.
    pub name: String,
    /// Referencing columns in the owning table.
    pub columns: Vec<String>,
    /// Referenced table name.
    pub referenced_table: String,
    /// Referenced columns.
    pub referenced_columns: Vec<String>,
    /// ON DELETE action, rendered verbatim.
    #[serde(default = "default_fk_action")]
    pub on_delete: String,
    /// ON UPDATE action, rendered verbatim.
    #[serde(default = "default_fk_action")]
    pub on_update: String,
}

impl ForeignKeyDescriptor {
    /// Creates a foreign key with `NO ACTION` for both actions.
    #[must_use]
    pub fn new<I, S, J, T>(
        name: impl Into<String>,
        columns: I,
        referenced_table: impl Into<String>,
        referenced_columns: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
            on_delete: default_fk_action(),
            on_update: default_fk_action(),
        }
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = action.into();
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: impl Into<String>) -> Self {
        self.on_update = action.into();
        self
    }
}

/// A snapshot of a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name, unique within a snapshot.
    pub name: String,
    /// Namespace. Empty means the default schema.
    #[serde(default)]
    pub schema: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,
    /// Indexes on this table.
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
    /// Foreign key constraints on this table.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

impl TableDescriptor {
    /// Creates an empty table in the default schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: String::new(),
            columns: vec![],
            indexes: vec![],
            foreign_keys: vec![],
        }
    }

    /// Sets the schema namespace.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends an index.
    #[must_use]
    pub fn index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    /// Appends a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKeyDescriptor) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Looks up a foreign key by name.
    #[must_use]
    pub fn get_foreign_key(&self, name: &str) -> Option<&ForeignKeyDescriptor> {
        self.foreign_keys.iter().find(|f| f.name == name)
    }

    /// Primary key column names, in declaration order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Table identity used in rendered SQL.
///
/// `schema` is empty when the table lives in the default schema and is
/// rendered unqualified.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableRef {
    /// Namespace. Empty means the default schema.
    pub schema: String,
    /// Table name.
    pub name: String,
}

impl TableRef {
    /// Creates a table reference.
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

/// An unordered collection of tables describing one schema state.
///
/// Table order is declaration order and carries no meaning for diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tables: Vec<TableDescriptor>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds a table.
    #[must_use]
    pub fn with_table(mut self, table: TableDescriptor) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds a table in place.
    pub fn add_table(&mut self, table: TableDescriptor) {
        self.tables.push(table);
    }

    /// All tables in declaration order.
    #[must_use]
    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns `true` if the snapshot has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl From<Vec<TableDescriptor>> for Snapshot {
    fn from(tables: Vec<TableDescriptor>) -> Self {
        Self { tables }
    }
}

impl FromIterator<TableDescriptor> for Snapshot {
    fn from_iter<I: IntoIterator<Item = TableDescriptor>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}
