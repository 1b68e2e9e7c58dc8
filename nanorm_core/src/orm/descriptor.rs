use crate::types::value::Value;
use crate::types::Row;

/// Row-shaped description of a table itself (for example its `key` name).
///
/// This is plain metadata carried by a [`Table`](super::Table); storage never
/// sees it and it is never matched by `find`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDescriptor {
    fields: Row,
}

impl TableDescriptor {
    pub fn new(fields: Row) -> Self {
        Self { fields }
    }

    /// Descriptor whose `key` field is the table name.
    pub fn named(name: &str) -> Self {
        Self::new(Row::new().with("key", name))
    }

    pub fn fields(&self) -> &Row {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.set(field, value);
    }
}
