//! Context Batcher
//!
//! One batching run: count the prompt, size the context file against the
//! ceiling, write the selected prefix and expose the resulting batch.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::batch::{materialize, strategy_for, MaterializedBatch};
use crate::config::BatcherConfig;
use crate::context::budget::BatchResult;
use crate::context::format::{detect_format, RecordFormat};
use crate::context::records::count_records_in_file;
use crate::context::tokens::count_tokens;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ContextBatcher {
    prompt: String,
    prompt_tokens: u32,
    context_path: Option<PathBuf>,
    format: Option<RecordFormat>,
    result: BatchResult,
    batch: Option<MaterializedBatch>,
}

impl ContextBatcher {
    /// Run batching for `prompt` and an optional context file.
    ///
    /// Without a context file only the prompt is counted and no batch is
    /// written.
    pub fn new(config: &BatcherConfig, prompt: &str, context_path: Option<&Path>) -> Result<Self> {
        let prompt_tokens = count_tokens(prompt);

        let Some(path) = context_path else {
            return Ok(Self {
                prompt: prompt.to_string(),
                prompt_tokens,
                context_path: None,
                format: None,
                result: BatchResult {
                    units_selected: 0,
                    units_remaining: 0,
                    projected_total_tokens: prompt_tokens as f64,
                    units_skipped: 0,
                },
                batch: None,
            });
        };

        let format = detect_format(path)?;
        let content = fs::read_to_string(path)?;
        let strategy = strategy_for(format);

        let result = strategy.size(&content, prompt_tokens, config.budget())?;
        let batch = materialize(strategy.as_ref(), path, result.units_selected, &config.output_dir)?;

        debug!(prompt_tokens, "Prompt tokens");
        debug!(batch_tokens = batch.batch_tokens, "Batch tokens");
        debug!(total = prompt_tokens + batch.batch_tokens, "Prompt + batch tokens");
        info!(
            source = %path.display(),
            format = %format,
            selected = result.units_selected,
            remaining = result.units_remaining,
            skipped = result.units_skipped,
            "Context batch prepared"
        );

        Ok(Self {
            prompt: prompt.to_string(),
            prompt_tokens,
            context_path: Some(path.to_path_buf()),
            format: Some(format),
            result,
            batch: Some(batch),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    pub fn context_path(&self) -> Option<&Path> {
        self.context_path.as_deref()
    }

    pub fn format(&self) -> Option<RecordFormat> {
        self.format
    }

    pub fn result(&self) -> &BatchResult {
        &self.result
    }

    pub fn batch(&self) -> Option<&MaterializedBatch> {
        self.batch.as_ref()
    }

    pub fn batch_path(&self) -> Option<&Path> {
        self.batch.as_ref().map(|b| b.path.as_path())
    }

    /// Authoritative token cost of the written batch (0 when none)
    pub fn batch_tokens(&self) -> u32 {
        self.batch.as_ref().map(|b| b.batch_tokens).unwrap_or(0)
    }

    /// Projected tokens from sizing; the raw prompt count when no context
    pub fn current_tokens(&self) -> f64 {
        self.result.projected_total_tokens
    }

    pub fn is_csv(&self) -> bool {
        self.format == Some(RecordFormat::Csv)
    }

    pub fn is_json(&self) -> bool {
        self.format == Some(RecordFormat::Json)
    }

    pub fn is_jsonl(&self) -> bool {
        self.format == Some(RecordFormat::Jsonl)
    }

    /// Units in the written batch file, counted from disk
    pub fn number_of_rows(&self) -> Result<usize> {
        match self.batch_path() {
            Some(path) => count_records_in_file(path),
            None => Ok(0),
        }
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            source: self.context_path.clone(),
            format: self.format,
            prompt_tokens: self.prompt_tokens,
            units_selected: self.result.units_selected,
            units_remaining: self.result.units_remaining,
            units_skipped: self.result.units_skipped,
            projected_total_tokens: self.result.projected_total_tokens,
            batch_path: self.batch_path().map(Path::to_path_buf),
            batch_tokens: self.batch_tokens(),
        }
    }
}

/// Flat view of a run for reporting
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub source: Option<PathBuf>,
    pub format: Option<RecordFormat>,
    pub prompt_tokens: u32,
    pub units_selected: usize,
    pub units_remaining: usize,
    pub units_skipped: usize,
    pub projected_total_tokens: f64,
    pub batch_path: Option<PathBuf>,
    pub batch_tokens: u32,
}
