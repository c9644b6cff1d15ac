//! Output formatting shared by every command: a human table by default,
//! JSON when `--format json` is passed.

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table output with colors.
    #[default]
    Table,
    /// Machine-readable JSON output.
    Json,
}

/// Print a single row of `(label, value)` pairs as a two-column table, or
/// as a JSON object when `format` is [`OutputFormat::Json`].
pub fn print_record<T: Serialize>(format: OutputFormat, value: &T, rows: &[(&str, String)]) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string()));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec!["field", "value"]);
            for (label, value) in rows {
                table.add_row(vec![label.to_string(), value.clone()]);
            }
            println!("{table}");
        }
    }
}

/// Print a list of records as a table or as a JSON array.
pub fn print_list<T: Serialize>(format: OutputFormat, values: &[T], header: &[&str], rows: impl Fn(&T) -> Vec<String>) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(values).unwrap_or_else(|_| "[]".to_string()));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(header);
            for value in values {
                table.add_row(rows(value));
            }
            println!("{table}");
        }
    }
}

/// Print an informational line.
pub fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

/// Print a success line.
pub fn print_success(message: &str) {
    println!("{}", message.green());
}

/// Print a warning line.
pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}
