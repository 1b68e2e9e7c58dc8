//! Flat-file backend.
//!
//! Every table lives in memory as an ordered list of positional rows; reads
//! and updates are linear scans. The file at `path` is only the durability
//! layer and is rewritten whole, according to the handle's [`FlushPolicy`].

mod codec;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, StorageError};
use crate::storage::catalog::Catalog;
use crate::storage::conform::{compile_fields, conform_row, matches_compiled, row_from_values};
use crate::storage::engine::Storage;
use crate::storage::registry::{FILE_TYPES, TypeRegistry};
use crate::storage::schema::Schema;
use crate::types::value::Value;
use crate::types::{Filter, Row};

use codec::TableRows;

/// When FileStorage writes its file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// `create`, `insert` and `update` rewrite the file before returning.
    #[default]
    EveryWrite,
    /// Writes are buffered until `flush`, `disconnect`, reconnect or drop.
    OnDisconnect,
}

impl FromStr for FlushPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "every_write" => Ok(FlushPolicy::EveryWrite),
            "on_disconnect" => Ok(FlushPolicy::OnDisconnect),
            other => Err(format!(
                "Unknown flush policy '{other}'. Use every_write|on_disconnect"
            )),
        }
    }
}

#[derive(Debug)]
pub struct FileStorage {
    flush: FlushPolicy,
    state: Option<OpenStore>,
}

#[derive(Debug)]
struct OpenStore {
    path: PathBuf,
    catalog: Catalog,
    tables: TableRows,
    dirty: bool,
}

impl OpenStore {
    fn rows(&self, table: &str) -> Result<&Vec<Vec<Value>>> {
        self.tables
            .get(table)
            .ok_or_else(|| StorageError::table_not_found(table))
    }

    fn rows_mut(&mut self, table: &str) -> Result<&mut Vec<Vec<Value>>> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| StorageError::table_not_found(table))
    }

    fn persist(&mut self) -> Result<()> {
        codec::save(&self.path, &self.catalog, &self.tables)?;
        self.dirty = false;
        Ok(())
    }

    /// Marks the store modified and writes it out under `EveryWrite`.
    fn written(&mut self, flush: FlushPolicy) -> Result<()> {
        self.dirty = true;
        if flush == FlushPolicy::EveryWrite {
            self.persist()?;
        }
        Ok(())
    }
}

impl FileStorage {
    /// Opens (or starts) the store at `path`, writing on every mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, FlushPolicy::default())
    }

    pub fn open_with(path: impl AsRef<Path>, flush: FlushPolicy) -> Result<Self> {
        let mut storage = Self { flush, state: None };
        storage.connect(path.as_ref())?;
        Ok(storage)
    }

    pub fn flush_policy(&self) -> FlushPolicy {
        self.flush
    }

    /// True when buffered writes have not reached the file yet.
    pub fn is_dirty(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.dirty)
    }

    fn store(&self) -> Result<&OpenStore> {
        self.state.as_ref().ok_or(StorageError::NotConnected)
    }

    fn store_mut(&mut self) -> Result<&mut OpenStore> {
        self.state.as_mut().ok_or(StorageError::NotConnected)
    }

    fn scan(&self, table: &str, filter: &Filter, limit: Option<usize>) -> Result<Vec<Row>> {
        let store = self.store()?;
        let schema = store.catalog.schema(table)?;
        let compiled = compile_fields(table, schema, filter)?;
        let rows = store.rows(table)?;
        Ok(rows
            .iter()
            .filter(|values| matches_compiled(values, &compiled))
            .take(limit.unwrap_or(usize::MAX))
            .map(|values| row_from_values(schema, values))
            .collect())
    }
}

impl Storage for FileStorage {
    fn types(&self) -> &'static TypeRegistry {
        &FILE_TYPES
    }

    fn connect(&mut self, path: &Path) -> Result<()> {
        self.disconnect()?;
        let (catalog, tables) = codec::load(path)?;
        info!(
            path = %path.display(),
            tables = catalog.len(),
            "file storage connected"
        );
        self.state = Some(OpenStore {
            path: path.to_path_buf(),
            catalog,
            tables,
            dirty: false,
        });
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(store) = self.state.as_mut() {
            if store.dirty {
                store.persist()?;
            }
            info!(path = %store.path.display(), "file storage disconnected");
        }
        self.state = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.is_some()
    }

    fn path(&self) -> Option<&Path> {
        self.state.as_ref().map(|s| s.path.as_path())
    }

    fn create(&mut self, table: &str, schema: &Schema) -> Result<()> {
        let flush = self.flush;
        let store = self.store_mut()?;
        if !store.catalog.create_table(table, schema)? {
            return Ok(());
        }
        store.tables.insert(table.to_string(), Vec::new());
        if let Err(e) = store.written(flush) {
            store.catalog.drop_table(table);
            store.tables.remove(table);
            return Err(e);
        }
        debug!(table, columns = schema.column_count(), "created table");
        Ok(())
    }

    fn insert(&mut self, table: &str, row: &Row) -> Result<()> {
        let flush = self.flush;
        let store = self.store_mut()?;
        let values = conform_row(table, store.catalog.schema(table)?, row)?;
        store.rows_mut(table)?.push(values);
        if let Err(e) = store.written(flush) {
            store.rows_mut(table)?.pop();
            return Err(e);
        }
        debug!(table, "inserted row");
        Ok(())
    }

    fn select_one(&self, table: &str, filter: &Filter) -> Result<Option<Row>> {
        Ok(self.scan(table, filter, Some(1))?.into_iter().next())
    }

    fn select_many(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        self.scan(table, filter, None)
    }

    fn update(&mut self, table: &str, filter: &Filter, replacement: &Row) -> Result<usize> {
        let flush = self.flush;
        let store = self.store_mut()?;
        let (compiled, assignments) = {
            let schema = store.catalog.schema(table)?;
            (
                compile_fields(table, schema, filter)?,
                compile_fields(table, schema, replacement)?,
            )
        };

        let mut matched = 0usize;
        let mut previous: Vec<(usize, Vec<Value>)> = Vec::new();
        for (i, row) in store.rows_mut(table)?.iter_mut().enumerate() {
            if !matches_compiled(row, &compiled) {
                continue;
            }
            matched += 1;
            if assignments.is_empty() {
                continue;
            }
            previous.push((i, row.clone()));
            for (idx, new_value) in &assignments {
                if let Some(slot) = row.get_mut(*idx) {
                    *slot = new_value.clone();
                }
            }
        }

        if previous.is_empty() {
            return Ok(matched);
        }
        if let Err(e) = store.written(flush) {
            let rows = store.rows_mut(table)?;
            for (i, old) in previous {
                rows[i] = old;
            }
            return Err(e);
        }
        debug!(table, matched, "updated rows");
        Ok(matched)
    }

    fn tables(&self) -> Result<Vec<String>> {
        Ok(self.store()?.catalog.table_names())
    }

    fn schema(&self, table: &str) -> Result<Schema> {
        self.store()?.catalog.schema(table).cloned()
    }

    fn flush(&mut self) -> Result<()> {
        let store = self.store_mut()?;
        if store.dirty {
            store.persist()?;
        }
        Ok(())
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        if let Some(store) = self.state.as_mut() {
            if store.dirty {
                if let Err(e) = store.persist() {
                    warn!(path = %store.path.display(), error = %e, "failed to flush file storage on drop");
                }
            }
        }
    }
}
