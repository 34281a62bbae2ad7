use serde::Serialize;
use serde_json::{Map, Value};

/// Column width at which property values wrap.
pub const WRAP_WIDTH: usize = 72;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Property/value table for a single resource. Long values wrap onto
/// continuation rows.
pub fn print_dict(fields: &Map<String, Value>) {
    print_table(&["PROPERTY", "VALUE"], dict_rows(fields));
}

pub fn dict_rows(fields: &Map<String, Value>) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for (key, value) in fields {
        let text = cell(value);
        let mut lines = wrap(&text, WRAP_WIDTH).into_iter();
        rows.push(vec![key.clone(), lines.next().unwrap_or_default()]);
        rows.extend(lines.map(|line| vec![String::new(), line]));
    }
    rows
}

/// Render a JSON value for a table cell: strings bare, null empty,
/// everything else as compact JSON.
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn opt(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
    }
    lines
}
