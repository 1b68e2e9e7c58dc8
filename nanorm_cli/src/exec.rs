use nanorm_core::types::value::parse_value;
use nanorm_core::{Result, Row, Schema, Storage, StorageError};

use crate::command::{Assignment, Command};
use crate::format::{format_rows, format_schema};

pub fn execute(storage: &mut dyn Storage, cmd: Command) -> Result<String> {
    match cmd {
        Command::Tables => Ok(storage.tables()?.join("\n")),
        Command::Schema { table } => Ok(format_schema(&storage.schema(&table)?)),
        Command::Create { table, columns } => {
            let pairs: Vec<(&str, &str)> = columns
                .iter()
                .map(|(name, tag)| (name.as_str(), tag.as_str()))
                .collect();
            let schema = Schema::from_tags(storage.types(), &pairs)?;
            storage.create(&table, &schema)?;
            Ok(format!("created table {table}"))
        }
        Command::Insert { table, fields } => {
            let schema = storage.schema(&table)?;
            storage.insert(&table, &typed_fields(&schema, &fields)?)?;
            Ok(format!("inserted 1 row into {table}"))
        }
        Command::Select { table, filter } => {
            let schema = storage.schema(&table)?;
            let rows = storage.select_many(&table, &typed_fields(&schema, &filter)?)?;
            Ok(format_rows(&schema, &rows))
        }
        Command::Update {
            table,
            filter,
            assignments,
        } => {
            let schema = storage.schema(&table)?;
            let matched = storage.update(
                &table,
                &typed_fields(&schema, &filter)?,
                &typed_fields(&schema, &assignments)?,
            )?;
            Ok(format!("updated {matched} rows in {table}"))
        }
    }
}

fn typed_fields(schema: &Schema, pairs: &[Assignment]) -> Result<Row> {
    let mut row = Row::new();
    for (name, raw) in pairs {
        let col = schema
            .column(name)
            .ok_or_else(|| StorageError::schema(format!("Unknown column '{name}'")))?;
        row.set(name.clone(), parse_value(col.dtype, raw)?);
    }
    Ok(row)
}
