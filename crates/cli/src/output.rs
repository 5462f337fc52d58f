//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use function_lib::{Batch, Column, DataType};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn parse_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Print a table from a list of items
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a batch as one row per index entry
pub fn batch_table(batch: &Batch) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["Entity".to_string(), "Timestamp".to_string()];
    header.extend(batch.column_names().map(str::to_string));
    builder.push_record(header);

    for (row, key) in batch.index().iter().enumerate() {
        let mut record = vec![key.entity_id.clone(), key.timestamp.to_rfc3339()];
        for name in batch.column_names() {
            let cell = match batch.column(name) {
                Ok(Column::Float(values)) => format_float(values[row]),
                Ok(Column::Bool(values)) => color_flag(values[row]),
                Err(_) => String::new(),
            };
            record.push(cell);
        }
        builder.push_record(record);
    }

    builder.build().with(Style::rounded()).to_string()
}

pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".dimmed().to_string()
    } else {
        format!("{:.4}", value)
    }
}

/// Raised flags are highlighted
pub fn color_flag(flag: bool) -> String {
    if flag {
        "true".red().bold().to_string()
    } else {
        "false".dimmed().to_string()
    }
}

pub fn format_datatype(datatype: DataType) -> String {
    match datatype {
        DataType::Float => "float".to_string(),
        DataType::Bool => "bool".to_string(),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use function_lib::RowKey;

    #[test]
    fn test_parse_format_name() {
        assert_eq!(OutputFormat::parse_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse_name("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::parse_name("yaml"), None);
    }

    #[test]
    fn test_batch_table_has_one_row_per_key() {
        colored::control::set_override(false);

        let ts = "2024-01-01T00:00:00Z".parse().unwrap();
        let mut batch = Batch::new(vec![RowKey::new("pump-1", ts), RowKey::new("pump-2", ts)]);
        batch.set_floats("temp", vec![1.5, f64::NAN]).unwrap();
        batch.set_bools("temp_alert", vec![false, true]).unwrap();

        let table = batch_table(&batch);
        assert!(table.contains("temp_alert"));
        assert!(table.contains("pump-2"));
        assert!(table.contains("1.5000"));
        assert!(table.contains("NaN"));
    }
}
