//! Line-oriented JSON I/O for the CLI
//!
//! - Input: one JSON request per line on stdin
//! - Output: one JSON response per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Non-blank lines from `reader`
pub fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<String>> {
    reader
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
}

/// Write one line and flush
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> CliResult<()> {
    writeln!(writer, "{}", line)?;
    writer.flush()?;
    Ok(())
}

/// Write pretty JSON followed by a newline
pub fn write_pretty<W: Write, T: Serialize>(writer: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *writer, value)
        .map_err(|e| CliError::json("<stdout>", e))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Read and parse a JSON file
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| CliError::json(path, e))
}
