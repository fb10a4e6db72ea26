//! Output formatters
//!
//! Render gathered roles to a writer. The roles are expected to be sorted
//! already; formatters never reorder them.

mod json;
mod markdown;
mod pretty;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use pretty::PrettyFormatter;

use ghstat_core::domain::field::Field;
use ghstat_core::domain::role::Role;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::error::EngineError;

/// Renders roles to a writer
pub trait Formatter: Send + Sync {
    fn render(&self, roles: &[Role], out: &mut dyn Write) -> io::Result<()>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// Formatter implementing this format
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Pretty => Box::new(PrettyFormatter),
            OutputFormat::Markdown => Box::new(MarkdownFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(OutputFormat::Pretty),
            "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(EngineError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column headers shared by the table formatters
pub(crate) fn headers() -> Vec<&'static str> {
    let mut headers = vec!["Lead", "Role"];
    headers.extend(Field::ALL.iter().map(|f| f.header()));
    headers
}

/// Cells of one table row, in header order
pub(crate) fn row(role: &Role) -> Vec<String> {
    let mut cells = vec![role.lead().to_string(), role.title().to_string()];
    cells.extend(Field::ALL.iter().map(|f| role.count(*f).to_string()));
    cells
}

/// Display width of every column across the headers and all rows
pub(crate) fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}
