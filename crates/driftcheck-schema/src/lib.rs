//! Schema model types for driftcheck.
//!
//! This crate contains the in-memory shape that both sides of a comparison
//! are reduced to: the *expected* schema (whatever declares the data model)
//! and the *actual* schema (whatever a live database reports). Loaders build
//! these values, the diff engine only ever reads them.
//!
//! Tables and columns are stored in [`IndexMap`]s keyed by their own name, so
//! declaration order survives and a key can never disagree with the name of
//! the descriptor it points at.

use indexmap::IndexMap;
use std::fmt;

/// One column, as seen from either side of a comparison.
///
/// Every fact except the name is optional. On the expected side an absent
/// fact means "not asserted" and is never compared; on the actual side the
/// introspector fills in everything it knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name, case-sensitive
    pub name: String,
    /// Raw type name (vendor spelling or a loose hint)
    pub type_name: Option<String>,
    /// Whether the column accepts NULL
    pub is_nullable: Option<bool>,
    /// Whether the column has a default expression (informational)
    pub has_default: Option<bool>,
    /// Maximum character length (informational)
    pub max_length: Option<i32>,
    /// Numeric precision (informational)
    pub numeric_precision: Option<i32>,
    /// Numeric scale (informational)
    pub numeric_scale: Option<i32>,
}

impl ColumnDescriptor {
    /// Create a column with only a name; nothing else is asserted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the raw type name.
    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Assert that the column is nullable.
    pub fn nullable(mut self) -> Self {
        self.is_nullable = Some(true);
        self
    }

    /// Assert that the column is `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.is_nullable = Some(false);
        self
    }

    /// Record whether the column has a default.
    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = Some(has_default);
        self
    }

    /// The type name, if one is known.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}

/// A single relation: a set of columns keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name, case-sensitive
    pub name: String,
    /// Columns, indexed by name
    pub columns: IndexMap<String, ColumnDescriptor>,
}

impl TableDescriptor {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
        }
    }

    /// Build a table from columns, rejecting duplicate column names.
    pub fn from_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = ColumnDescriptor>,
    ) -> Result<Self, ModelError> {
        let mut table = Self::new(name);
        for column in columns {
            table.insert_column(column)?;
        }
        Ok(table)
    }

    /// Add a column, failing if one with the same name already exists.
    pub fn insert_column(&mut self, column: ColumnDescriptor) -> Result<(), ModelError> {
        if self.columns.contains_key(&column.name) {
            return Err(ModelError::DuplicateColumn {
                table: self.name.clone(),
                column: column.name,
            });
        }
        self.columns.insert(column.name.clone(), column);
        Ok(())
    }

    /// Chaining builder; a column with the same name is replaced in place.
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    /// Get a column by name.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(name)
    }

    /// Whether a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Iterate over columns in declaration order.
    pub fn iter_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.values()
    }
}

/// A complete schema: tables indexed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaModel {
    /// Tables, indexed by name
    pub tables: IndexMap<String, TableDescriptor>,
}

impl SchemaModel {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from tables, rejecting duplicate table names.
    pub fn from_tables(
        tables: impl IntoIterator<Item = TableDescriptor>,
    ) -> Result<Self, ModelError> {
        let mut schema = Self::new();
        for table in tables {
            schema.insert_table(table)?;
        }
        Ok(schema)
    }

    /// Add a table, failing if one with the same name already exists.
    pub fn insert_table(&mut self, table: TableDescriptor) -> Result<(), ModelError> {
        if self.tables.contains_key(&table.name) {
            return Err(ModelError::DuplicateTable { table: table.name });
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Chaining builder; a table with the same name is replaced in place.
    pub fn table(mut self, table: TableDescriptor) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Get a table by name.
    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    /// Whether a table with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names in declaration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Iterate over all tables.
    pub fn iter_tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values()
    }

    /// Copy of this schema without the tables matching any of `patterns`.
    ///
    /// A pattern is either an exact table name or a prefix followed by `*`
    /// (e.g. `_sqlx*`).
    pub fn without_tables<S: AsRef<str>>(&self, patterns: &[S]) -> Self {
        let tables = self
            .tables
            .iter()
            .filter(|(name, _)| !patterns.iter().any(|p| matches_pattern(p.as_ref(), name)))
            .map(|(name, table)| (name.clone(), table.clone()))
            .collect();
        Self { tables }
    }
}

/// Match a table name against an ignore pattern (exact, or `prefix*`).
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

/// Structural problems found while building a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("table '{table}' is declared more than once")]
    DuplicateTable { table: String },

    #[error("column '{table}.{column}' is declared more than once")]
    DuplicateColumn { table: String, column: String },
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ty) = &self.type_name {
            write!(f, ": {}", ty)?;
        }
        match self.is_nullable {
            Some(true) => write!(f, " (nullable)"),
            Some(false) => write!(f, " NOT NULL"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests;
