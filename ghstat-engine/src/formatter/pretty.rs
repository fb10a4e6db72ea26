//! Terminal table formatter

use colored::Colorize;
use ghstat_core::domain::role::Role;
use std::io::{self, Write};

use super::{Formatter, column_widths, headers, row};

const COLUMN_GAP: &str = "  ";

/// Aligned table for the terminal
///
/// Headers are green and underlined, the lead column is yellow.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrettyFormatter;

impl Formatter for PrettyFormatter {
    fn render(&self, roles: &[Role], out: &mut dyn Write) -> io::Result<()> {
        let headers = headers();
        let rows: Vec<Vec<String>> = roles.iter().map(row).collect();
        let widths = column_widths(&headers, &rows);

        let header_line: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", h, w = *w).green().underline().to_string())
            .collect();
        writeln!(out, "{}", header_line.join(COLUMN_GAP).trim_end())?;

        for cells in &rows {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    let padded = format!("{:<w$}", cell, w = *w);
                    if i == 0 {
                        padded.yellow().to_string()
                    } else {
                        padded
                    }
                })
                .collect();
            writeln!(out, "{}", line.join(COLUMN_GAP).trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::tests::sample_roles;

    #[test]
    fn test_pretty_table_alignment() {
        colored::control::set_override(false);

        let mut out = Vec::new();
        PrettyFormatter.render(&sample_roles(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Lead        Role      CVs  Decisions  Scheduling  WI (Screen)  WI (Grade)  Stale",
                "Joe Bloggs  Role 123  17   17         17          17           17          17",
                "Joe Bloggs  Role 456  4    4          4           4            4           4",
            ]
        );
    }
}
