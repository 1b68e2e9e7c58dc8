use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

use tracing::debug;

use crate::SharedStorage;
use crate::error::{Result, StorageError};
use crate::orm::descriptor::TableDescriptor;
use crate::orm::record::Record;
use crate::orm::TableMeta;
use crate::storage::Schema;
use crate::storage::conform::conform_row;
use crate::storage::registry::FILE_TYPES;
use crate::types::value::Value;
use crate::types::{Filter, Row};

/// Everything a [`Table`] needs to know about its rows: the table name, the
/// fixed schema, and per-column defaults applied when building records.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub name: String,
    pub schema: Schema,
    pub defaults: Row,
}

impl TableConfig {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            defaults: Row::new(),
        }
    }

    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.set(field, value);
        self
    }

    pub fn with_defaults(mut self, defaults: Row) -> Self {
        for (field, value) in defaults {
            self.defaults.set(field, value);
        }
        self
    }
}

/// Binds a storage handle and a table name, producing and locating records.
///
/// Records passed to [`Table::add`] are kept in a live registry for the
/// lifetime of the table. [`Table::find`] and [`Table::find_one`] never
/// consult it: they always rebuild records from storage.
#[derive(Debug)]
pub struct Table {
    storage: SharedStorage,
    meta: Rc<TableMeta>,
    defaults: Row,
    descriptor: TableDescriptor,
    live: HashMap<String, Record>,
}

impl Table {
    /// Validates the config and declares the table in storage.
    pub fn new(storage: SharedStorage, config: TableConfig) -> Result<Self> {
        let TableConfig {
            name,
            schema,
            defaults,
        } = config;

        for (field, value) in defaults.iter() {
            let col = schema.column(field).ok_or_else(|| {
                StorageError::schema(format!(
                    "Default for unknown column '{field}' in table '{name}'"
                ))
            })?;
            if col.dtype != value.dtype() {
                return Err(StorageError::schema(format!(
                    "Default for '{field}' in table '{name}' expects {} but got {}",
                    col.dtype,
                    value.dtype()
                )));
            }
        }

        storage.borrow_mut().create(&name, &schema)?;
        let descriptor = TableDescriptor::named(&name);
        Ok(Self {
            storage,
            meta: Rc::new(TableMeta { name, schema }),
            defaults,
            descriptor,
            live: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn schema(&self) -> &Schema {
        &self.meta.schema
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn descriptor_mut(&mut self) -> &mut TableDescriptor {
        &mut self.descriptor
    }

    /// Builds a record that is not yet stored: defaults first, then `fields`,
    /// in schema order.
    pub fn record(&self, fields: Row) -> Result<Record> {
        for name in fields.names() {
            if self.meta.schema.column(name).is_none() {
                return Err(StorageError::FieldNotFound(name.to_string()));
            }
        }

        let merged: Row = self
            .meta
            .schema
            .columns()
            .iter()
            .filter_map(|col| {
                fields
                    .get(&col.name)
                    .or_else(|| self.defaults.get(&col.name))
                    .map(|v| (col.name.clone(), v.clone()))
            })
            .collect();
        conform_row(&self.meta.name, &self.meta.schema, &merged)?;

        Ok(Record::attach(self.storage.clone(), self.meta.clone(), merged))
    }

    /// Stores the record and registers it in the live registry, returning
    /// the registered instance.
    pub fn add(&mut self, record: Record) -> Result<&mut Record> {
        if record.table() != self.meta.name {
            return Err(StorageError::schema(format!(
                "Record of table '{}' cannot be added to table '{}'",
                record.table(),
                self.meta.name
            )));
        }
        self.storage
            .borrow_mut()
            .insert(&self.meta.name, record.fields())?;

        debug!(table = %self.meta.name, "registered record");
        let slot = match self.live.entry(canonical_key(record.fields())) {
            Entry::Occupied(mut e) => {
                e.insert(record);
                e.into_mut()
            }
            Entry::Vacant(e) => e.insert(record),
        };
        Ok(slot)
    }

    pub fn find(&self, filter: &Filter) -> Result<Vec<Record>> {
        let rows = self
            .storage
            .borrow()
            .select_many(&self.meta.name, filter)?;
        Ok(rows.into_iter().map(|row| self.wrap(row)).collect())
    }

    pub fn find_one(&self, filter: &Filter) -> Result<Option<Record>> {
        let row = self
            .storage
            .borrow()
            .select_one(&self.meta.name, filter)?;
        Ok(row.map(|row| self.wrap(row)))
    }

    /// Registered record whose full field set was `fields` when added and
    /// still matches it.
    pub fn live(&self, fields: &Row) -> Option<&Record> {
        self.live
            .get(&canonical_key(fields))
            .filter(|r| r.fields().matches(fields))
    }

    pub fn live_mut(&mut self, fields: &Row) -> Option<&mut Record> {
        match self.live.get_mut(&canonical_key(fields)) {
            Some(r) if r.fields().matches(fields) => Some(r),
            _ => None,
        }
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    fn wrap(&self, row: Row) -> Record {
        Record::attach(self.storage.clone(), self.meta.clone(), row)
    }
}

/// Order-independent encoding of a field set. Each part is length-prefixed
/// so that separators inside text values cannot collide.
fn canonical_key(fields: &Row) -> String {
    let mut parts: Vec<(&str, &Value)> = fields.iter().collect();
    parts.sort_by(|a, b| a.0.cmp(b.0));
    let mut out = String::new();
    for (name, value) in parts {
        let token = format!("{}:{value}", FILE_TYPES.repr(value.dtype()));
        for p in [name, token.as_str()] {
            out.push_str(&p.len().to_string());
            out.push(':');
            out.push_str(p);
            out.push(';');
        }
    }
    out
}
