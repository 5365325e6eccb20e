// Context Batcher Library
// Exports core modules for use by the CLI binary

pub mod batch;
pub mod batcher;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod inference;
pub mod models;
pub mod prompt;

// Re-export commonly used types for CLI
pub use batch::{
    materialize, size_batch, strategy_for, BatchStrategy, CsvBatch, JsonBatch, JsonlBatch,
    MaterializedBatch, DEFAULT_OUTPUT_DIR,
};
pub use batcher::{BatchSummary, ContextBatcher};
pub use config::{BatcherConfig, Config, InferenceConfig, ModelIds};
pub use context::{
    count_records, count_records_in_file, count_tokens, detect_format,
    inflated_prompt_cost, BatchResult, RecordFormat, TokenBudget, DEFAULT_CEILING, PROMPT_INFLATION,
};
pub use error::BatchError;
pub use handler::{handle, HandlerResponse, InvocationEvent};
pub use inference::{extract_generated_text, BedrockClient, InferenceService};
pub use models::{ClaudeRequest, LlamaRequest, ModelKind, ModelRequest, NovaProRequest};
pub use prompt::PromptTemplate;
