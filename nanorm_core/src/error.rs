//! Error taxonomy shared by both backends and the Table/Record layer.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Wrong columns or wrong value types for a table's schema, or an
    /// invalid/conflicting schema declaration.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    /// Operation on a handle after `disconnect` without a new `connect`.
    #[error("storage is not connected")]
    NotConnected,

    #[error("field '{0}' does not exist")]
    FieldNotFound(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing store exists but its contents cannot be decoded.
    #[error("malformed store: {0}")]
    Corrupt(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    pub fn table_not_found(table: &str) -> Self {
        Self::TableNotFound(table.to_string())
    }
}
