//! Row, filter and replacement validation shared by both backends, so that
//! every schema error is raised identically regardless of the store.

use crate::error::{Result, StorageError};
use crate::storage::schema::Schema;
use crate::types::datatype::DataType;
use crate::types::value::Value;
use crate::types::{Filter, Row};

/// Checks that `row` names exactly the schema's columns with matching types
/// and returns its values in schema order.
pub(crate) fn conform_row(table: &str, schema: &Schema, row: &Row) -> Result<Vec<Value>> {
    for (name, _) in row.iter() {
        if schema.column(name).is_none() {
            return Err(StorageError::schema(format!(
                "Unknown column '{name}' for table '{table}'"
            )));
        }
    }

    let mut values = Vec::with_capacity(schema.column_count());
    for col in schema.columns() {
        let value = row.get(&col.name).ok_or_else(|| {
            StorageError::schema(format!(
                "Missing column '{}' for table '{table}'",
                col.name
            ))
        })?;
        check_type(table, &col.name, col.dtype, value)?;
        values.push(value.clone());
    }
    Ok(values)
}

/// Resolves each named column of a filter or replacement to its position,
/// checking that the value type matches the column.
pub(crate) fn compile_fields(
    table: &str,
    schema: &Schema,
    fields: &Filter,
) -> Result<Vec<(usize, Value)>> {
    let mut compiled = Vec::with_capacity(fields.len());
    for (name, value) in fields.iter() {
        let idx = schema.column_index(name).ok_or_else(|| {
            StorageError::schema(format!("Unknown column '{name}' for table '{table}'"))
        })?;
        let col = &schema.columns()[idx];
        check_type(table, &col.name, col.dtype, value)?;
        compiled.push((idx, value.clone()));
    }
    Ok(compiled)
}

pub(crate) fn matches_compiled(values: &[Value], compiled: &[(usize, Value)]) -> bool {
    compiled
        .iter()
        .all(|(idx, expected)| values.get(*idx) == Some(expected))
}

pub(crate) fn row_from_values(schema: &Schema, values: &[Value]) -> Row {
    schema
        .columns()
        .iter()
        .zip(values)
        .map(|(col, v)| (col.name.clone(), v.clone()))
        .collect()
}

fn check_type(
    table: &str,
    column: &str,
    dtype: DataType,
    value: &Value,
) -> Result<()> {
    if value.dtype() != dtype {
        return Err(StorageError::schema(format!(
            "Column '{column}' of table '{table}' expects {dtype} but got {}",
            value.dtype()
        )));
    }
    Ok(())
}
