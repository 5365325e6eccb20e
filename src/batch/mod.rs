//! Batch Sizing
//!
//! Greedy token-budgeted selection of a record prefix, one strategy per record
//! format, plus materialization of the selected prefix to disk.

pub mod csv_batch;
pub mod json_batch;
pub mod jsonl_batch;
pub mod materialize;

use std::path::Path;

use crate::context::budget::{BatchResult, TokenBudget};
use crate::context::format::RecordFormat;
use crate::error::Result;

pub use csv_batch::CsvBatch;
pub use json_batch::JsonBatch;
pub use jsonl_batch::JsonlBatch;
pub use materialize::{materialize, MaterializedBatch, DEFAULT_OUTPUT_DIR};

/// Format-specific half of the batching contract.
///
/// `size` splits content into units and runs the shared greedy scan;
/// `write_prefix` re-encodes the first `units` units of a source file.
pub trait BatchStrategy {
    fn format(&self) -> RecordFormat;

    /// Size a batch from raw content. Pure: never touches the filesystem.
    fn size(&self, content: &str, prompt_tokens: u32, budget: TokenBudget) -> Result<BatchResult>;

    /// Write the first `units` units of `source` to `dest`, returning how many
    /// were actually written.
    fn write_prefix(&self, source: &Path, units: usize, dest: &Path) -> Result<usize>;
}

/// Pick the strategy for a detected format
pub fn strategy_for(format: RecordFormat) -> Box<dyn BatchStrategy> {
    match format {
        RecordFormat::Csv => Box::new(CsvBatch),
        RecordFormat::Json => Box::new(JsonBatch),
        RecordFormat::Jsonl => Box::new(JsonlBatch),
    }
}

/// Size a batch for content of a known format.
pub fn size_batch(
    content: &str,
    prompt_tokens: u32,
    format: RecordFormat,
    budget: TokenBudget,
) -> Result<BatchResult> {
    strategy_for(format).size(content, prompt_tokens, budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_for_matches_format() {
        for format in [RecordFormat::Csv, RecordFormat::Json, RecordFormat::Jsonl] {
            assert_eq!(strategy_for(format).format(), format);
        }
    }

    #[test]
    fn test_size_batch_dispatches() {
        let budget = TokenBudget::new(1_000);

        let csv = size_batch("a,b\n1,2", 0, RecordFormat::Csv, budget).unwrap();
        assert_eq!(csv.units_selected, 2);

        let json = size_batch(r#"[{"a": 1}, {"a": 2}, {"a": 3}]"#, 0, RecordFormat::Json, budget).unwrap();
        assert_eq!(json.units_selected, 3);

        let jsonl = size_batch("{\"a\":1}\nbad\n", 0, RecordFormat::Jsonl, budget).unwrap();
        assert_eq!(jsonl.units_selected, 1);
        assert_eq!(jsonl.units_skipped, 1);
    }
}
