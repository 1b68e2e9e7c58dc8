use std::rc::Rc;

use crate::SharedStorage;
use crate::error::{Result, StorageError};
use crate::orm::TableMeta;
use crate::types::value::Value;
use crate::types::{Filter, Row};

/// One row as a live object.
///
/// Field values are kept in schema order. `set` writes through to storage
/// before returning, so memory and the persisted row never disagree.
#[derive(Debug, Clone)]
pub struct Record {
    storage: SharedStorage,
    meta: Rc<TableMeta>,
    fields: Row,
}

impl Record {
    /// `fields` must already conform to the table schema.
    pub(crate) fn attach(storage: SharedStorage, meta: Rc<TableMeta>, fields: Row) -> Self {
        Self {
            storage,
            meta,
            fields,
        }
    }

    /// Name of the table this record belongs to.
    pub fn table(&self) -> &str {
        &self.meta.name
    }

    pub fn fields(&self) -> &Row {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Result<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| StorageError::FieldNotFound(field.to_string()))
    }

    /// Value of the identifying (first) column.
    pub fn key(&self) -> Result<&Value> {
        self.get(&self.meta.schema.key_column().name)
    }

    /// Updates the given fields in memory and in storage.
    ///
    /// Every field is validated before anything is written. The storage
    /// update is filtered on the record's current key value.
    pub fn set(&mut self, fields: &Row) -> Result<()> {
        for (name, value) in fields.iter() {
            let col = self
                .meta
                .schema
                .column(name)
                .ok_or_else(|| StorageError::FieldNotFound(name.to_string()))?;
            if value.dtype() != col.dtype {
                return Err(StorageError::schema(format!(
                    "Field '{name}' expects {} but got {}",
                    col.dtype,
                    value.dtype()
                )));
            }
        }
        if fields.is_empty() {
            return Ok(());
        }

        let key_name = &self.meta.schema.key_column().name;
        let filter = Filter::new().with(key_name.clone(), self.get(key_name)?.clone());
        self.storage
            .borrow_mut()
            .update(&self.meta.name, &filter, fields)?;

        for (name, value) in fields.iter() {
            self.fields.set(name, value.clone());
        }
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.meta.name == other.meta.name && self.fields == other.fields
    }
}
