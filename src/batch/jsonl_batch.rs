//! Sizing for JSON-lines files.
//!
//! Blank lines and lines that fail to parse are not units: they are dropped
//! from both the selected and the remaining counts.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::BatchStrategy;
use crate::context::budget::{BatchResult, GreedyScan, TokenBudget};
use crate::context::encode::to_spaced_string;
use crate::context::format::RecordFormat;
use crate::context::tokens::count_tokens;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlBatch;

/// Split JSONL content into the costs of its valid lines.
///
/// Returns the per-line costs in order and the number of malformed lines.
pub fn valid_line_costs(content: &str) -> (Vec<u32>, usize) {
    let mut costs = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in content.trim().split('\n').enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(_) => costs.push(count_tokens(line)),
            Err(e) => {
                debug!(line = line_no + 1, error = %e, "Skipping malformed JSONL line");
                skipped += 1;
            }
        }
    }

    (costs, skipped)
}

impl BatchStrategy for JsonlBatch {
    fn format(&self) -> RecordFormat {
        RecordFormat::Jsonl
    }

    fn size(&self, content: &str, prompt_tokens: u32, budget: TokenBudget) -> Result<BatchResult> {
        let (costs, skipped) = valid_line_costs(content);

        let mut scan = GreedyScan::new(budget, prompt_tokens);
        for cost in &costs {
            if !scan.offer(*cost) {
                break;
            }
        }

        Ok(scan.finish(costs.len(), skipped))
    }

    fn write_prefix(&self, source: &Path, units: usize, dest: &Path) -> Result<usize> {
        let reader = BufReader::new(File::open(source)?);
        let mut writer = BufWriter::new(File::create(dest)?);

        let mut written = 0usize;
        for line in reader.lines() {
            if written >= units {
                break;
            }
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(value) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            writer.write_all(to_spaced_string(&value)?.as_bytes())?;
            writer.write_all(b"\n")?;
            written += 1;
        }
        writer.flush()?;

        Ok(written)
    }
}
