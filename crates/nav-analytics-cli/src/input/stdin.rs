use serde_json::Value;
use std::io::{self, Read};

use super::file::csv_records;

/// Read a series piped on stdin: JSON when it starts with `[` or `{`,
/// otherwise CSV with a header row. Returns None if stdin is a TTY or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed)?;
        return Ok(Some(value));
    }

    let records = csv_records(trimmed.as_bytes())?;
    Ok(Some(Value::Array(records)))
}
