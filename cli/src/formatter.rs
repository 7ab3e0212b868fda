use anyhow::Result;
use colored::Colorize;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use serde_json::Value;

pub enum OutputFormat {
    Json,
    Pretty,
    Table,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Pretty,
        }
    }
}

pub fn format_json(value: &Value, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::Pretty => {
            let json_str = serde_json::to_string_pretty(&round_floats(value))?;
            Ok(colored_json::to_colored_json_auto(&json_str)?.to_string())
        }
        OutputFormat::Table => match round_floats(value) {
            Value::Object(map) => {
                let rows: Vec<Vec<String>> = map
                    .iter()
                    .map(|(key, val)| vec![key.clone(), format_value_compact(val)])
                    .collect();
                Ok(numeric_table(&["metric", "value"], &rows))
            }
            other => Ok(serde_json::to_string_pretty(&other)?),
        },
    }
}

/// Rounds fractional numbers to four places for display.
fn round_floats(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .and_then(|f| serde_json::Number::from_f64((f * 10_000.0).round() / 10_000.0))
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        Value::Array(items) => Value::Array(items.iter().map(round_floats).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| (key.clone(), round_floats(val)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Table with a bold header and right-aligned data columns.
pub fn numeric_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    let header: Vec<Cell> = header
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(header);

    for row in rows {
        let cells: Vec<Cell> = row
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let cell = Cell::new(text);
                if i == 0 {
                    cell
                } else {
                    cell.set_alignment(CellAlignment::Right)
                }
            })
            .collect();
        table.add_row(cells);
    }

    table.to_string()
}

fn format_value_compact(val: &Value) -> String {
    match val {
        Value::Null => "null".dimmed().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

pub fn print_heading(msg: &str) {
    println!("\n{}", msg.bright_cyan().bold());
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}
