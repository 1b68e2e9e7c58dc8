//! Abstract column type tags and their per-backend representations.
//!
//! Callers declare schemas with the tags `int` and `str`; each backend maps
//! them onto its own on-disk representation.

use crate::error::{Result, StorageError};
use crate::types::datatype::DataType;

const TAGS: [(&str, DataType); 2] = [("int", DataType::Int), ("str", DataType::Text)];

#[derive(Debug)]
pub struct TypeRegistry {
    backend: &'static str,
    int_repr: &'static str,
    text_repr: &'static str,
}

/// FileStorage representations are the cell token prefixes.
pub static FILE_TYPES: TypeRegistry = TypeRegistry::new("file", "i", "t");

/// SqliteStorage representations are the declared column types.
pub static SQLITE_TYPES: TypeRegistry = TypeRegistry::new("sqlite", "INTEGER", "TEXT");

impl TypeRegistry {
    pub const fn new(
        backend: &'static str,
        int_repr: &'static str,
        text_repr: &'static str,
    ) -> Self {
        Self {
            backend,
            int_repr,
            text_repr,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Resolves an abstract tag to its column type.
    pub fn get(&self, tag: &str) -> Result<DataType> {
        TAGS.iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, dtype)| *dtype)
            .ok_or_else(|| StorageError::schema(format!("Unknown type '{tag}'. Use int|str")))
    }

    pub fn repr(&self, dtype: DataType) -> &'static str {
        match dtype {
            DataType::Int => self.int_repr,
            DataType::Text => self.text_repr,
        }
    }

    pub fn from_repr(&self, repr: &str) -> Option<DataType> {
        if repr.eq_ignore_ascii_case(self.int_repr) {
            Some(DataType::Int)
        } else if repr.eq_ignore_ascii_case(self.text_repr) {
            Some(DataType::Text)
        } else {
            None
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> {
        TAGS.iter().map(|(t, _)| *t)
    }
}
