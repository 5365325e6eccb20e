//! Batch materialization.
//!
//! Writes the selected prefix to `batch_inicial.<ext>` in the output directory,
//! then re-reads it to get the authoritative token cost. Re-encoding (CSV
//! quoting, JSON indentation) can move the count away from the sizing estimate.
//!
//! Runs that share an output directory overwrite each other's batch file;
//! concurrent runs race and the last writer wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::BatchStrategy;
use crate::context::format::RecordFormat;
use crate::context::tokens::count_tokens;
use crate::error::Result;

/// Output directory used when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "./tmp/";

/// A batch file written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedBatch {
    pub path: PathBuf,
    pub format: RecordFormat,
    /// Units actually present in the file
    pub units_written: usize,
    /// Token cost of the written file; use this over the sizing projection
    pub batch_tokens: u32,
    pub created_at: DateTime<Utc>,
}

/// Write the first `units` units of `source` into `output_dir`.
pub fn materialize(
    strategy: &dyn BatchStrategy,
    source: &Path,
    units: usize,
    output_dir: &Path,
) -> Result<MaterializedBatch> {
    fs::create_dir_all(output_dir)?;

    let format = strategy.format();
    let path = output_dir.join(format.batch_file_name());
    let units_written = strategy.write_prefix(source, units, &path)?;
    debug!(path = %path.display(), units = units_written, "Batch stored");

    let batch_tokens = count_tokens(&fs::read_to_string(&path)?);
    debug!(path = %path.display(), batch_tokens, "Batch tokens recomputed");

    Ok(MaterializedBatch {
        path,
        format,
        units_written,
        batch_tokens,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{strategy_for, CsvBatch, JsonBatch, JsonlBatch};

    #[test]
    fn test_materialize_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("people.csv");
        fs::write(&source, "name,age\nana,30\nbia,25\n").unwrap();
        let out_dir = dir.path().join("nested").join("tmp");

        let batch = materialize(&CsvBatch, &source, 2, &out_dir).unwrap();
        assert_eq!(batch.path, out_dir.join("batch_inicial.csv"));
        assert_eq!(batch.units_written, 2);
        assert_eq!(batch.batch_tokens, 2);
        assert_eq!(fs::read_to_string(&batch.path).unwrap(), "name,age\nana,30\n");
    }

    #[test]
    fn test_batch_tokens_reflect_reencoding() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("items.json");
        fs::write(&source, r#"[{"a":1,"b":2}]"#).unwrap();

        let batch = materialize(&JsonBatch, &source, 1, dir.path()).unwrap();
        // Sizing costs the element at 4 tokens; the indented file has 8
        assert_eq!(batch.batch_tokens, 8);
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("tmp");
        let sources = [
            ("a.csv", "h1,h2\n\"x, y\",2\n3,4\n"),
            ("a.json", r#"[{"k": [1, 2]}, {"k": null}, 3]"#),
            ("a.jsonl", "{\"k\":1}\nbad\n{\"k\":2}\n"),
        ];

        for (name, content) in sources {
            let source = dir.path().join(name);
            fs::write(&source, content).unwrap();
            let strategy = strategy_for(crate::context::format::detect_format(&source).unwrap());

            let first = materialize(strategy.as_ref(), &source, 2, &out_dir).unwrap();
            let first_bytes = fs::read(&first.path).unwrap();
            let second = materialize(strategy.as_ref(), &source, 2, &out_dir).unwrap();
            let second_bytes = fs::read(&second.path).unwrap();

            assert_eq!(first.path, second.path);
            assert_eq!(first_bytes, second_bytes);
            assert_eq!(first.batch_tokens, second.batch_tokens);
        }
    }

    #[test]
    fn test_rerun_overwrites_previous_batch() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("s.jsonl");
        fs::write(&source, "{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n").unwrap();

        materialize(&JsonlBatch, &source, 3, dir.path()).unwrap();
        let batch = materialize(&JsonlBatch, &source, 1, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&batch.path).unwrap(), "{\"a\": 1}\n");
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = materialize(&JsonlBatch, &dir.path().join("missing.jsonl"), 1, dir.path()).unwrap_err();
        assert!(matches!(err, crate::error::BatchError::Io(_)));
    }
}
