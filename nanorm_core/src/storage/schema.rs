use std::collections::HashSet;

use crate::error::{Result, StorageError};
use crate::storage::registry::TypeRegistry;
use crate::types::datatype::DataType;

/// Names SQLite resolves to the hidden row id that orders every table.
const ROW_ID_ALIASES: [&str; 3] = ["rowid", "oid", "_rowid_"];

/// Represents a single column in a table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Ordered list of typed columns, fixed once a table is created.
///
/// The first column is the identifying `key` column by convention. The
/// storage layer never enforces its uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema, rejecting empty column lists and empty or
    /// duplicate column names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(StorageError::schema("Schema must declare at least one column"));
        }
        let mut seen: HashSet<String> = HashSet::new();
        for c in &columns {
            if c.name.is_empty() {
                return Err(StorageError::schema("Column name cannot be empty"));
            }
            if ROW_ID_ALIASES
                .iter()
                .any(|alias| c.name.eq_ignore_ascii_case(alias))
            {
                return Err(StorageError::schema(format!(
                    "Column name '{}' is reserved",
                    c.name
                )));
            }
            // column names are case-insensitive
            if !seen.insert(c.name.to_ascii_lowercase()) {
                return Err(StorageError::schema(format!(
                    "Duplicate column '{}' in schema",
                    c.name
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn from_pairs(pairs: &[(&str, DataType)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|(name, dtype)| Column::new(*name, *dtype))
                .collect(),
        )
    }

    /// Builds a schema from abstract type tags (`int`, `str`) resolved through
    /// a backend's registry.
    pub fn from_tags(registry: &TypeRegistry, pairs: &[(&str, &str)]) -> Result<Self> {
        let mut columns = Vec::with_capacity(pairs.len());
        for (name, tag) in pairs {
            columns.push(Column::new(*name, registry.get(tag)?));
        }
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the number of columns in this schema
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn key_column(&self) -> &Column {
        &self.columns[0]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
