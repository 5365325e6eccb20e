//! Record format detection by file extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::BatchError;

/// How a context file is split into countable units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// Every newline-delimited line, header included
    Csv,
    /// One document: a list of units or a single all-or-nothing unit
    Json,
    /// One JSON value per non-blank line
    Jsonl,
}

impl RecordFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RecordFormat::Csv => "csv",
            RecordFormat::Json => "json",
            RecordFormat::Jsonl => "jsonl",
        }
    }

    /// Name of the materialized batch file for this format
    pub fn batch_file_name(self) -> String {
        format!("batch_inicial.{}", self.extension())
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for RecordFormat {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Ok(RecordFormat::Csv),
            "json" => Ok(RecordFormat::Json),
            "jsonl" => Ok(RecordFormat::Jsonl),
            other => Err(BatchError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Detect the record format from the path's extension (case-insensitive).
///
/// The content is never inspected here.
pub fn detect_format(path: &Path) -> Result<RecordFormat, BatchError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if extension.is_empty() {
        return Err(BatchError::UnsupportedFormat(path.display().to_string()));
    }
    extension.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_extensions() {
        assert_eq!(detect_format(Path::new("data.csv")).unwrap(), RecordFormat::Csv);
        assert_eq!(detect_format(Path::new("data.json")).unwrap(), RecordFormat::Json);
        assert_eq!(detect_format(Path::new("dir/data.jsonl")).unwrap(), RecordFormat::Jsonl);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(detect_format(Path::new("DATA.CSV")).unwrap(), RecordFormat::Csv);
        assert_eq!(detect_format(Path::new("x.JsonL")).unwrap(), RecordFormat::Jsonl);
    }

    #[test]
    fn test_detect_rejects_unknown() {
        let err = detect_format(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, BatchError::UnsupportedFormat(ref ext) if ext == ".txt"));

        let err = detect_format(Path::new("Makefile")).unwrap_err();
        assert!(matches!(err, BatchError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_batch_file_name() {
        assert_eq!(RecordFormat::Jsonl.batch_file_name(), "batch_inicial.jsonl");
        assert_eq!(RecordFormat::Csv.to_string(), "csv");
    }
}
