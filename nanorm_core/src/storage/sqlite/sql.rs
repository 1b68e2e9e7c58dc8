//! Statement text for SqliteStorage. Identifiers are always quoted; values
//! are always bound as numbered parameters.

use crate::storage::registry::SQLITE_TYPES;
use crate::storage::schema::Schema;
use crate::types::value::Value;

/// User relations. `substr` keeps the prefix test exact and case-sensitive.
pub(super) const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND substr(name, 1, 7) <> 'sqlite_' ORDER BY name";

pub(super) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(super) fn table_info(table: &str) -> String {
    format!("PRAGMA table_info({})", quote_ident(table))
}

pub(super) fn create_table(table: &str, schema: &Schema) -> String {
    let cols = schema
        .columns()
        .iter()
        .map(|c| format!("{} {} NOT NULL", quote_ident(&c.name), SQLITE_TYPES.repr(c.dtype)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({cols})", quote_ident(table))
}

pub(super) fn insert(table: &str, schema: &Schema) -> String {
    let names = column_list(schema);
    let params = (1..=schema.column_count())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({params})",
        quote_ident(table)
    )
}

pub(super) fn select(
    table: &str,
    schema: &Schema,
    filter: &[(usize, Value)],
    limit: Option<usize>,
) -> String {
    let mut sql = format!(
        "SELECT {} FROM {}{} ORDER BY rowid",
        column_list(schema),
        quote_ident(table),
        where_clause(schema, filter, 1)
    );
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {n}"));
    }
    sql
}

pub(super) fn count(table: &str, schema: &Schema, filter: &[(usize, Value)]) -> String {
    format!(
        "SELECT COUNT(*) FROM {}{}",
        quote_ident(table),
        where_clause(schema, filter, 1)
    )
}

/// Assignment parameters come first, filter parameters after them.
pub(super) fn update(
    table: &str,
    schema: &Schema,
    filter: &[(usize, Value)],
    assignments: &[(usize, Value)],
) -> String {
    let sets = assignments
        .iter()
        .enumerate()
        .map(|(i, (idx, _))| {
            format!("{} = ?{}", quote_ident(&schema.columns()[*idx].name), i + 1)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {sets}{}",
        quote_ident(table),
        where_clause(schema, filter, assignments.len() + 1)
    )
}

fn column_list(schema: &Schema) -> String {
    schema
        .columns()
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(schema: &Schema, filter: &[(usize, Value)], first_param: usize) -> String {
    if filter.is_empty() {
        return String::new();
    }
    let preds = filter
        .iter()
        .enumerate()
        .map(|(i, (idx, _))| {
            format!(
                "{} = ?{}",
                quote_ident(&schema.columns()[*idx].name),
                first_param + i
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(" WHERE {preds}")
}
