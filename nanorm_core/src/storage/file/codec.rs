//! On-disk layout of a FileStorage store: one JSON document holding every
//! table's schema and rows. Cells are type-tagged tokens (`i:42`, `t:bar`)
//! whose prefixes come from the file registry.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};
use crate::storage::catalog::Catalog;
use crate::storage::registry::FILE_TYPES;
use crate::storage::schema::{Column, Schema};
use crate::types::datatype::DataType;
use crate::types::value::Value;

const FORMAT_VERSION: u32 = 1;

pub(super) type TableRows = HashMap<String, Vec<Vec<Value>>>;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    tables: Vec<TableFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    name: String,
    columns: Vec<ColumnFile>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnFile {
    name: String,
    dtype: String,
}

/// Loads a store. A missing or blank file is an empty store.
pub(super) fn load(path: &Path) -> Result<(Catalog, TableRows)> {
    if !path.exists() {
        return Ok((Catalog::new(), HashMap::new()));
    }
    let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok((Catalog::new(), HashMap::new()));
    }

    let file: StoreFile = serde_json::from_str(&content)
        .map_err(|e| StorageError::Corrupt(format!("Malformed store JSON: {e}")))?;
    if file.version != FORMAT_VERSION {
        return Err(StorageError::Corrupt(format!(
            "Unsupported store version {} (expected {FORMAT_VERSION})",
            file.version
        )));
    }

    let mut catalog = Catalog::new();
    let mut tables: TableRows = HashMap::new();
    for t in file.tables {
        if catalog.exists(&t.name) {
            return Err(StorageError::Corrupt(format!(
                "Table '{}' appears twice in store",
                t.name
            )));
        }
        let mut columns = Vec::with_capacity(t.columns.len());
        for c in t.columns {
            let dtype = FILE_TYPES.get(&c.dtype).map_err(|_| {
                StorageError::Corrupt(format!("Unknown type '{}' in table '{}'", c.dtype, t.name))
            })?;
            columns.push(Column::new(c.name, dtype));
        }
        let schema = Schema::new(columns)
            .map_err(|e| StorageError::Corrupt(format!("Table '{}': {e}", t.name)))?;

        let mut rows = Vec::with_capacity(t.rows.len());
        for (row_no, tokens) in t.rows.iter().enumerate() {
            if tokens.len() != schema.column_count() {
                return Err(StorageError::Corrupt(format!(
                    "Malformed row in table '{}' at row {}: expected {} values, got {}",
                    t.name,
                    row_no + 1,
                    schema.column_count(),
                    tokens.len()
                )));
            }
            let row = tokens
                .iter()
                .zip(schema.columns())
                .map(|(tok, col)| decode_token(tok, col.dtype))
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }

        catalog.create_table(&t.name, &schema).map_err(|e| {
            StorageError::Corrupt(format!("Table '{}': {e}", t.name))
        })?;
        tables.insert(t.name, rows);
    }
    Ok((catalog, tables))
}

/// Writes the whole store atomically: temp file, fsync, rename.
pub(super) fn save(path: &Path, catalog: &Catalog, tables: &TableRows) -> Result<()> {
    let mut out = StoreFile {
        version: FORMAT_VERSION,
        tables: Vec::with_capacity(catalog.len()),
    };
    for name in catalog.table_names() {
        let schema = catalog.schema(&name)?;
        let columns = schema
            .columns()
            .iter()
            .map(|c| ColumnFile {
                name: c.name.clone(),
                dtype: c.dtype.name().to_string(),
            })
            .collect();
        let rows = tables
            .get(&name)
            .map(|rows| {
                rows.iter()
                    .map(|row| row.iter().map(encode_value).collect())
                    .collect()
            })
            .unwrap_or_default();
        out.tables.push(TableFile {
            name,
            columns,
            rows,
        });
    }

    let payload = serde_json::to_string_pretty(&out)
        .map_err(|e| StorageError::Corrupt(format!("Failed to serialize store as JSON: {e}")))?;

    crate::storage::ensure_parent_dir(path)?;
    let tmp = temp_path(path);
    let mut file = File::create(&tmp).map_err(|e| StorageError::io(&tmp, e))?;
    file.write_all(payload.as_bytes())
        .map_err(|e| StorageError::io(&tmp, e))?;
    file.sync_all().map_err(|e| StorageError::io(&tmp, e))?;
    drop(file);
    fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn encode_value(v: &Value) -> String {
    let prefix = FILE_TYPES.repr(v.dtype());
    match v {
        Value::Int(n) => format!("{prefix}:{n}"),
        Value::Text(s) => format!("{prefix}:{s}"),
    }
}

fn decode_token(token: &str, dtype: DataType) -> Result<Value> {
    let (prefix, raw) = token
        .split_once(':')
        .ok_or_else(|| StorageError::Corrupt(format!("Malformed value token '{token}'")))?;
    let expected = FILE_TYPES.repr(dtype);
    if prefix != expected {
        return Err(StorageError::Corrupt(format!(
            "Expected {dtype} token prefix '{expected}:' but got '{token}'"
        )));
    }
    match dtype {
        DataType::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| {
            StorageError::Corrupt(format!("Malformed int payload in token '{token}'"))
        }),
        DataType::Text => Ok(Value::Text(raw.to_string())),
    }
}
