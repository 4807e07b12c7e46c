//! JSON-lines I/O for the serving loop
//!
//! - Input: one JSON object per line
//! - Output: one JSON object per line, flushed after each
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Iterates request lines, skipping blank ones.
///
/// A line that is not JSON yields a recoverable `bad_request`; a read
/// failure yields an I/O error.
pub fn read_requests<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<Value>> {
    input.lines().filter_map(|line| match line {
        Err(e) => Some(Err(CliError::from(e))),
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(
            serde_json::from_str(&line)
                .map_err(|e| CliError::bad_request(format!("Invalid JSON: {}", e))),
        ),
    })
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_json(out, &response)
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_json(out, &response)
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
