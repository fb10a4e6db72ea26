//! Markdown table formatter

use ghstat_core::domain::role::Role;
use std::io::{self, Write};

use super::{Formatter, column_widths, headers, row};

/// Pretty-printed markdown table, every column padded to its widest cell
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    fn write_row<S: AsRef<str>>(out: &mut dyn Write, cells: &[S], widths: &[usize]) -> io::Result<()> {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
            .collect();
        writeln!(out, "| {} |", padded.join(" | "))
    }
}

impl Formatter for MarkdownFormatter {
    fn render(&self, roles: &[Role], out: &mut dyn Write) -> io::Result<()> {
        let headers = headers();
        let rows: Vec<Vec<String>> = roles.iter().map(row).collect();
        let widths = column_widths(&headers, &rows);

        Self::write_row(out, &headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        Self::write_row(out, &rule, &widths)?;
        for cells in &rows {
            Self::write_row(out, cells, &widths)?;
        }
        Ok(())
    }
}
