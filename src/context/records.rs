//! Record counting for reporting.
//!
//! Independent of batch sizing: counts units in content whose format is not
//! known up front, trying JSON, then JSONL, then plain lines.

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::format::{detect_format, RecordFormat};
use crate::error::{BatchError, Result};

/// Whether a JSON value counts as present (non-null, non-zero, non-empty)
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Units in a parsed JSON document
pub fn count_json_units(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        other if is_truthy(other) => 1,
        _ => 0,
    }
}

/// Non-blank lines that parse as JSON
pub fn count_jsonl_units(content: &str) -> usize {
    content
        .trim()
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter(|line| serde_json::from_str::<Value>(line).is_ok())
        .count()
}

/// Newline-delimited lines, or 0 for blank content
pub fn count_csv_lines(content: &str) -> usize {
    if content.trim().is_empty() {
        0
    } else {
        content.split('\n').count()
    }
}

/// Count units in content of unknown format: JSON, then JSONL, then CSV.
pub fn count_records(content: &str) -> usize {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return count_json_units(&value);
    }

    let jsonl = count_jsonl_units(content);
    if jsonl > 0 {
        return jsonl;
    }

    count_csv_lines(content)
}

/// Count units in a file, using its extension when it names a known format.
pub fn count_records_in_file(path: &Path) -> Result<usize> {
    let content = fs::read_to_string(path)?;

    let count = match detect_format(path) {
        Ok(RecordFormat::Json) => serde_json::from_str::<Value>(&content)
            .map(|value| count_json_units(&value))
            .unwrap_or(0),
        Ok(RecordFormat::Jsonl) => count_jsonl_units(&content),
        Ok(RecordFormat::Csv) => count_csv_lines(&content),
        Err(BatchError::UnsupportedFormat(_)) => count_records(&content),
        Err(e) => return Err(e),
    };

    Ok(count)
}
