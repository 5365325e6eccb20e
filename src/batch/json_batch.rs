//! Sizing for single-document JSON files.
//!
//! A top-level list is batched element by element. Any other value is one
//! unit that either fits whole or not at all.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::BatchStrategy;
use crate::context::budget::{BatchResult, GreedyScan, TokenBudget};
use crate::context::encode::to_spaced_string;
use crate::context::format::RecordFormat;
use crate::context::tokens::{count_tokens, inflated_prompt_cost};
use crate::error::{BatchError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBatch;

/// Parse a whole JSON document, mapping parse failures to `MalformedDocument`.
pub fn parse_document(content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| BatchError::MalformedDocument(e.to_string()))
}

impl BatchStrategy for JsonBatch {
    fn format(&self) -> RecordFormat {
        RecordFormat::Json
    }

    fn size(&self, content: &str, prompt_tokens: u32, budget: TokenBudget) -> Result<BatchResult> {
        match parse_document(content)? {
            Value::Array(items) => {
                let mut scan = GreedyScan::new(budget, prompt_tokens);
                for item in &items {
                    let cost = count_tokens(&to_spaced_string(item)?);
                    if !scan.offer(cost) {
                        break;
                    }
                }
                Ok(scan.finish(items.len(), 0))
            }
            _ => {
                // The raw document text is costed, not a re-encoding of it.
                let prompt_cost = inflated_prompt_cost(prompt_tokens);
                let document_cost = count_tokens(content);
                let (selected, total) = if budget.admits(prompt_cost, document_cost) {
                    (1, prompt_cost + document_cost as f64)
                } else {
                    (0, prompt_cost)
                };
                Ok(BatchResult {
                    units_selected: selected,
                    units_remaining: 1 - selected,
                    projected_total_tokens: total,
                    units_skipped: 0,
                })
            }
        }
    }

    fn write_prefix(&self, source: &Path, units: usize, dest: &Path) -> Result<usize> {
        let document = parse_document(&fs::read_to_string(source)?)?;

        let (batch, written) = match document {
            Value::Array(items) => {
                let prefix: Vec<Value> = items.into_iter().take(units).collect();
                let written = prefix.len();
                (Value::Array(prefix), written)
            }
            other if units > 0 => (other, 1),
            _ => (Value::Object(serde_json::Map::new()), 0),
        };

        fs::write(dest, serde_json::to_string_pretty(&batch)?)?;
        Ok(written)
    }
}
