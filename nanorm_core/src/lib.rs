//! Embedded record storage with interchangeable flat-file and SQLite
//! backends, and a small Table/Record mapping layer on top.
//!
//! ```ignore
//! use nanorm_core::{FileStorage, Row, Schema, Storage};
//!
//! let mut storage = FileStorage::open("./store.json")?;
//! let types = storage.types();
//! storage.create("test", &Schema::from_tags(types, &[("key", "int"), ("foo", "str")])?)?;
//! storage.insert("test", &Row::new().with("key", 1).with("foo", "bar"))?;
//! let rows = storage.select_many("test", &Row::new().with("foo", "bar"))?;
//! storage.disconnect()?;
//! ```

use std::cell::RefCell;
use std::rc::Rc;

pub mod config;
pub mod error;
pub mod orm;
pub mod storage;
pub mod types;

pub use config::{Backend, StorageConfig, open_shared, open_storage};
pub use error::{Result, StorageError};
pub use orm::{Record, Table, TableConfig, TableDescriptor};
pub use storage::{
    Column, FILE_TYPES, FileStorage, FlushPolicy, SQLITE_TYPES, Schema, SqliteStorage, Storage,
    TypeRegistry,
};
pub use types::datatype::DataType;
pub use types::value::Value;
pub use types::{Filter, Row};

/// Single-threaded storage handle shared by a table and its records.
pub type SharedStorage = Rc<RefCell<dyn Storage>>;

pub fn shared<S: Storage + 'static>(storage: S) -> SharedStorage {
    Rc::new(RefCell::new(storage))
}
