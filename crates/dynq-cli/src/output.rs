use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use dynq::{Row, Value};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn render_rows(rows: &[Row], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => Ok(rows_table(rows)),
    }
}

pub fn render_count(count: i64, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(
            &serde_json::json!({ "count": count }),
        )?),
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(vec![header_cell("count")]);
            table.add_row(vec![Cell::new(count).fg(Color::Yellow)]);
            Ok(table.to_string())
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(name: &str) -> Cell {
    Cell::new(name)
        .add_attribute(Attribute::Bold)
        .fg(Color::Cyan)
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::new("NULL").fg(Color::DarkGrey),
        Value::Int(_) | Value::Float(_) => Cell::new(value).fg(Color::Yellow),
        other => Cell::new(other),
    }
}

/// Columns come from the first row; every row of one query has the same shape.
fn rows_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "(0 rows)".to_string();
    };

    let mut table = new_table();
    table.set_header(first.keys().map(header_cell).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row.iter().map(|(_, v)| value_cell(v)).collect::<Vec<_>>());
    }

    let noun = if rows.len() == 1 { "row" } else { "rows" };
    format!("{table}\n({} {noun})", rows.len())
}
