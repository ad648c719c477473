//! Output formatting utilities

use crate::error::CliResult;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a list: full records as JSON, or one table row per record
pub fn render_rows<T, R, F>(data: &[T], format: OutputFormat, row: F) -> CliResult<()>
where
    T: Serialize,
    R: Tabled,
    F: FnMut(&T) -> R,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                let rows: Vec<R> = data.iter().map(row).collect();
                println!("{}", Table::new(rows));
            }
        }
    }
    Ok(())
}

/// Print a single item as JSON, or hand it to `text` for a short summary
pub fn render<T, F>(data: &T, format: OutputFormat, text: F) -> CliResult<()>
where
    T: Serialize,
    F: FnOnce(&T) -> Vec<String>,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Table => {
            for line in text(data) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
