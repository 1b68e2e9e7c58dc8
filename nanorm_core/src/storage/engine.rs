use std::fmt::Debug;
use std::path::Path;

use crate::error::Result;
use crate::storage::registry::TypeRegistry;
use crate::storage::schema::Schema;
use crate::types::{Filter, Row};

/// Storage contract shared by every backend.
///
/// All operations are synchronous. Any operation that touches tables fails
/// with `NotConnected` after `disconnect` until the next `connect`.
pub trait Storage: Debug {
    /// Column type registry used to declare schemas without naming backend
    /// types directly.
    fn types(&self) -> &'static TypeRegistry;

    /// Opens the durable store at `path`, closing the current one first.
    fn connect(&mut self, path: &Path) -> Result<()>;

    /// Flushes pending writes and closes the store. No-op when already closed.
    fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Path of the open store, if any.
    fn path(&self) -> Option<&Path>;

    /// Declares a table. Identical redeclaration is a no-op; a conflicting
    /// one fails with `SchemaViolation`.
    fn create(&mut self, table: &str, schema: &Schema) -> Result<()>;

    /// Appends a row that names exactly the table's columns.
    fn insert(&mut self, table: &str, row: &Row) -> Result<()>;

    /// First matching row in insertion order.
    fn select_one(&self, table: &str, filter: &Filter) -> Result<Option<Row>>;

    /// All matching rows in insertion order.
    fn select_many(&self, table: &str, filter: &Filter) -> Result<Vec<Row>>;

    /// Overwrites the `replacement` fields of every row matching `filter` and
    /// returns how many rows matched.
    fn update(&mut self, table: &str, filter: &Filter, replacement: &Row) -> Result<usize>;

    /// Sorted names of all declared tables.
    fn tables(&self) -> Result<Vec<String>>;

    fn schema(&self, table: &str) -> Result<Schema>;

    /// Forces pending writes to the durable medium.
    fn flush(&mut self) -> Result<()>;
}
