//! Embedded relational backend on SQLite.
//!
//! Each table is a relation with one typed column per schema column.
//! Statements autocommit, so every successful write is durable on return.

mod sql;

use std::path::{Path, PathBuf};

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::storage::catalog::Catalog;
use crate::storage::conform::{compile_fields, conform_row, row_from_values};
use crate::storage::engine::Storage;
use crate::storage::registry::{SQLITE_TYPES, TypeRegistry};
use crate::storage::schema::{Column, Schema};
use crate::types::datatype::DataType;
use crate::types::value::Value;
use crate::types::{Filter, Row};

/// Connection pragmas. The rollback journal is left in its default mode so
/// a closed store is a single file.
const PRAGMAS: &str = "PRAGMA synchronous = FULL;
     PRAGMA busy_timeout = 5000;";

#[derive(Debug, Default)]
pub struct SqliteStorage {
    state: Option<OpenDb>,
}

#[derive(Debug)]
struct OpenDb {
    path: PathBuf,
    conn: Connection,
    catalog: Catalog,
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Int(n) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*n)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut storage = Self::default();
        storage.connect(path.as_ref())?;
        Ok(storage)
    }

    fn db(&self) -> Result<&OpenDb> {
        self.state.as_ref().ok_or(StorageError::NotConnected)
    }

    fn db_mut(&mut self) -> Result<&mut OpenDb> {
        self.state.as_mut().ok_or(StorageError::NotConnected)
    }

    fn query(&self, table: &str, filter: &Filter, limit: Option<usize>) -> Result<Vec<Row>> {
        let db = self.db()?;
        let schema = db.catalog.schema(table)?;
        let compiled = compile_fields(table, schema, filter)?;
        let mut stmt = db.conn.prepare(&sql::select(table, schema, &compiled, limit))?;
        let mut rows = stmt.query(params_from_iter(compiled.iter().map(|(_, v)| v)))?;

        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            let mut values = Vec::with_capacity(schema.column_count());
            for (i, col) in schema.columns().iter().enumerate() {
                values.push(match col.dtype {
                    DataType::Int => Value::Int(r.get(i)?),
                    DataType::Text => Value::Text(r.get(i)?),
                });
            }
            out.push(row_from_values(schema, &values));
        }
        Ok(out)
    }
}

/// Rebuilds the catalog from the relations already stored in the file.
fn load_catalog(conn: &Connection) -> Result<Catalog> {
    let mut stmt = conn.prepare(sql::LIST_TABLES)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    let mut catalog = Catalog::new();
    for name in names {
        let mut info = conn.prepare(&sql::table_info(&name))?;
        let declared = info
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;

        let mut columns = Vec::with_capacity(declared.len());
        for (col, decl) in declared {
            let dtype = SQLITE_TYPES.from_repr(&decl).ok_or_else(|| {
                StorageError::Corrupt(format!(
                    "Unsupported column type '{decl}' for '{name}.{col}'"
                ))
            })?;
            columns.push(Column::new(col, dtype));
        }
        let schema = Schema::new(columns)
            .map_err(|e| StorageError::Corrupt(format!("Table '{name}': {e}")))?;
        catalog.create_table(&name, &schema)?;
    }
    Ok(catalog)
}

impl Storage for SqliteStorage {
    fn types(&self) -> &'static TypeRegistry {
        &SQLITE_TYPES
    }

    fn connect(&mut self, path: &Path) -> Result<()> {
        self.disconnect()?;
        crate::storage::ensure_parent_dir(path)?;
        let conn = Connection::open(path)?;
        conn.execute_batch(PRAGMAS)?;
        let catalog = load_catalog(&conn)?;
        info!(
            path = %path.display(),
            tables = catalog.len(),
            "sqlite storage connected"
        );
        self.state = Some(OpenDb {
            path: path.to_path_buf(),
            conn,
            catalog,
        });
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(db) = self.state.take() {
            let OpenDb { path, conn, .. } = db;
            conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;
            info!(path = %path.display(), "sqlite storage disconnected");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.is_some()
    }

    fn path(&self) -> Option<&Path> {
        self.state.as_ref().map(|db| db.path.as_path())
    }

    fn create(&mut self, table: &str, schema: &Schema) -> Result<()> {
        let db = self.db_mut()?;
        if !db.catalog.create_table(table, schema)? {
            return Ok(());
        }
        if let Err(e) = db.conn.execute(&sql::create_table(table, schema), []) {
            db.catalog.drop_table(table);
            return Err(e.into());
        }
        debug!(table, columns = schema.column_count(), "created table");
        Ok(())
    }

    fn insert(&mut self, table: &str, row: &Row) -> Result<()> {
        let db = self.db()?;
        let schema = db.catalog.schema(table)?;
        let values = conform_row(table, schema, row)?;
        db.conn
            .execute(&sql::insert(table, schema), params_from_iter(values.iter()))?;
        debug!(table, "inserted row");
        Ok(())
    }

    fn select_one(&self, table: &str, filter: &Filter) -> Result<Option<Row>> {
        Ok(self.query(table, filter, Some(1))?.into_iter().next())
    }

    fn select_many(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        self.query(table, filter, None)
    }

    fn update(&mut self, table: &str, filter: &Filter, replacement: &Row) -> Result<usize> {
        let db = self.db()?;
        let schema = db.catalog.schema(table)?;
        let compiled = compile_fields(table, schema, filter)?;
        let assignments = compile_fields(table, schema, replacement)?;

        if assignments.is_empty() {
            let matched: i64 = db.conn.query_row(
                &sql::count(table, schema, &compiled),
                params_from_iter(compiled.iter().map(|(_, v)| v)),
                |r| r.get(0),
            )?;
            return Ok(matched as usize);
        }

        let params = assignments.iter().chain(compiled.iter()).map(|(_, v)| v);
        let matched = db.conn.execute(
            &sql::update(table, schema, &compiled, &assignments),
            params_from_iter(params),
        )?;
        debug!(table, matched, "updated rows");
        Ok(matched)
    }

    fn tables(&self) -> Result<Vec<String>> {
        Ok(self.db()?.catalog.table_names())
    }

    fn schema(&self, table: &str) -> Result<Schema> {
        self.db()?.catalog.schema(table).cloned()
    }

    fn flush(&mut self) -> Result<()> {
        self.db().map(|_| ())
    }
}
