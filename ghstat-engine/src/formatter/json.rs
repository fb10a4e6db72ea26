//! JSON formatter

use ghstat_core::domain::role::Role;
use std::io::{self, Write};

use super::Formatter;

/// Pretty-printed JSON array of roles
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn render(&self, roles: &[Role], out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, roles)?;
        writeln!(out)
    }
}
