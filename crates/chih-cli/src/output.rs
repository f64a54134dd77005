// crates/chih-cli/src/output.rs
//
// Output formatting utilities for the Chih CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// One line of a two-column detail table.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print a JSON object result either raw or as a Field/Value table, using
/// `labels` to pick and name the fields shown.
pub fn print_result(format: OutputFormat, value: &serde_json::Value, labels: &[(&str, &str)]) {
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = labels
                .iter()
                .map(|(key, label)| FieldRow {
                    field: label.to_string(),
                    value: display_value(&value[*key]),
                })
                .collect();
            println!("{}", format_table(&rows));
        }
    }
}

fn display_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value_unquotes_strings() {
        assert_eq!(display_value(&json!("1.5")), "1.5");
        assert_eq!(display_value(&json!(7)), "7");
        assert_eq!(display_value(&json!(null)), "-");
    }

    #[test]
    fn test_format_table_has_labels() {
        let rows = vec![FieldRow {
            field: "Staked".to_string(),
            value: "10".to_string(),
        }];
        let table = format_table(&rows);
        assert!(table.contains("Field"));
        assert!(table.contains("Staked"));
    }
}
