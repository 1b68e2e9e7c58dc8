pub mod schema;
pub mod catalog;
pub mod engine;
pub mod registry;
pub mod file;
pub mod sqlite;
pub(crate) mod conform;

use std::fs;
use std::path::Path;

use crate::error::{Result, StorageError};

// Re-export main types for convenience
pub use schema::{Schema, Column};
pub use catalog::Catalog;
pub use engine::Storage;
pub use registry::{TypeRegistry, FILE_TYPES, SQLITE_TYPES};
pub use file::{FileStorage, FlushPolicy};
pub use sqlite::SqliteStorage;

/// Creates the directory that will hold a store file, if it is missing.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))
        }
        _ => Ok(()),
    }
}
