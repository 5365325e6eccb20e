//! Context Management Module
//!
//! Token estimation, budgets, record formats and record counting for the
//! context files that get batched into a model request.

pub mod budget;
pub mod encode;
pub mod format;
pub mod records;
pub mod tokens;

// Re-export public types for external use
pub use budget::{BatchResult, GreedyScan, TokenBudget, DEFAULT_CEILING};
pub use format::{detect_format, RecordFormat};
pub use records::{count_records, count_records_in_file};
pub use tokens::{count_tokens, inflated_prompt_cost, PROMPT_INFLATION};
