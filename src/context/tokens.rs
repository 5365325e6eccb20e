//! Whitespace token estimation.
//!
//! Token cost is the number of whitespace-delimited words. This is a crude
//! stand-in for a subword tokenizer; the batch ceilings are tuned against it,
//! so it must not be swapped for a real tokenizer without re-tuning them.

/// Multiplier applied to the prompt's token count before budgeting.
pub const PROMPT_INFLATION: f64 = 1.5;

/// Count whitespace-delimited tokens in text.
///
/// Any run of whitespace separates tokens; empty or all-whitespace text is 0.
/// The information separators U+001C..U+001F count as whitespace too.
pub fn count_tokens(text: &str) -> u32 {
    text.split(is_separator).filter(|t| !t.is_empty()).count() as u32
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Prompt cost reserved in the budget before any record is admitted.
pub fn inflated_prompt_cost(prompt_tokens: u32) -> f64 {
    prompt_tokens as f64 * PROMPT_INFLATION
}
