//! Backend selection and construction from a serializable config.

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SharedStorage;
use crate::error::{Result, StorageError};
use crate::storage::{FileStorage, FlushPolicy, SqliteStorage, Storage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Backend::File),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(format!("Unknown backend '{other}'. Use file|sqlite")),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::File => f.write_str("file"),
            Backend::Sqlite => f.write_str("sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,
    pub path: PathBuf,
    /// Only consulted by the file backend.
    #[serde(default)]
    pub flush: FlushPolicy,
}

impl StorageConfig {
    pub fn new(backend: Backend, path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            path: path.into(),
            flush: FlushPolicy::default(),
        }
    }

    pub fn with_flush(mut self, flush: FlushPolicy) -> Self {
        self.flush = flush;
        self
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| StorageError::Config(format!("Malformed config JSON: {e}")))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        Self::from_json_str(&content)
    }
}

/// Opens the configured backend, connected to `config.path`.
pub fn open_storage(config: &StorageConfig) -> Result<Box<dyn Storage>> {
    let storage: Box<dyn Storage> = match config.backend {
        Backend::File => Box::new(FileStorage::open_with(&config.path, config.flush)?),
        Backend::Sqlite => Box::new(SqliteStorage::open(&config.path)?),
    };
    Ok(storage)
}

/// Like [`open_storage`], but returns a handle that tables and records can
/// share.
pub fn open_shared(config: &StorageConfig) -> Result<SharedStorage> {
    let storage: SharedStorage = match config.backend {
        Backend::File => Rc::new(RefCell::new(FileStorage::open_with(
            &config.path,
            config.flush,
        )?)),
        Backend::Sqlite => Rc::new(RefCell::new(SqliteStorage::open(&config.path)?)),
    };
    Ok(storage)
}
