use nanorm_core::{Row, Schema};

/// Formats rows as a tab-separated table with a header line.
pub fn format_rows(schema: &Schema, rows: &[Row]) -> String {
    let header = schema
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("\t");

    if rows.is_empty() {
        return header;
    }

    let row_lines = rows
        .iter()
        .map(|row| {
            row.values()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{header}\n{row_lines}")
}

pub fn format_schema(schema: &Schema) -> String {
    schema
        .columns()
        .iter()
        .map(|c| format!("{}\t{}", c.name, c.dtype))
        .collect::<Vec<_>>()
        .join("\n")
}
