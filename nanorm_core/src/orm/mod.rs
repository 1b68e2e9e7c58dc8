//! Table/Record mapping: rows as addressable, mutable objects whose
//! mutations write through to storage immediately.

mod descriptor;
mod record;
mod table;

pub use descriptor::TableDescriptor;
pub use record::Record;
pub use table::{Table, TableConfig};

use crate::storage::Schema;

/// Name and schema of a table, shared by the table and its records.
#[derive(Debug)]
pub(crate) struct TableMeta {
    pub(crate) name: String,
    pub(crate) schema: Schema,
}
