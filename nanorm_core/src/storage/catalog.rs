use std::collections::BTreeMap;

use crate::error::{Result, StorageError};
use crate::storage::schema::Schema;

/// Prefix SQLite keeps for its own relations.
const RESERVED_PREFIX: &str = "sqlite_";

/// Manages table schemas (metadata catalog)
#[derive(Debug, Default)]
pub struct Catalog {
    tables: BTreeMap<String, Schema>,
}

impl Catalog {
    /// Creates a new empty catalog
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Checks if a table exists in the catalog
    pub fn exists(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Registers a table schema.
    /// Returns `false` when an identical schema was already registered and
    /// an error when the existing schema differs.
    pub fn create_table(&mut self, table: &str, schema: &Schema) -> Result<bool> {
        if table.is_empty() {
            return Err(StorageError::schema("Table name cannot be empty"));
        }
        if table
            .get(..RESERVED_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(RESERVED_PREFIX))
        {
            return Err(StorageError::schema(format!(
                "Table name '{table}' uses the reserved prefix '{RESERVED_PREFIX}'"
            )));
        }
        if let Some(other) = self
            .tables
            .keys()
            .find(|name| name.as_str() != table && name.eq_ignore_ascii_case(table))
        {
            return Err(StorageError::schema(format!(
                "Table '{table}' clashes with existing table '{other}' (names are case-insensitive)"
            )));
        }
        if let Some(existing) = self.tables.get(table) {
            if existing == schema {
                return Ok(false);
            }
            return Err(StorageError::schema(format!(
                "Table '{table}' already exists with a different schema"
            )));
        }
        self.tables.insert(table.to_string(), schema.clone());
        Ok(true)
    }

    /// Retrieves the schema for a given table
    /// Returns an error if the table does not exist
    pub fn schema(&self, table: &str) -> Result<&Schema> {
        self.tables
            .get(table)
            .ok_or_else(|| StorageError::table_not_found(table))
    }

    pub fn drop_table(&mut self, table: &str) {
        self.tables.remove(table);
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
