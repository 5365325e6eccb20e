//! Token Budget Management
//!
//! Tracks how much of the ceiling the inflated prompt and the admitted records
//! consume while a batch is being sized.

use serde::{Deserialize, Serialize};

use super::tokens::inflated_prompt_cost;

/// Default ceiling for prompt plus batch
pub const DEFAULT_CEILING: u32 = 60_000;

/// Ceiling on the estimated tokens of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBudget {
    pub ceiling: u32,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}

impl TokenBudget {
    pub fn new(ceiling: u32) -> Self {
        Self { ceiling }
    }

    /// A unit fits if it brings the total up to the ceiling, but not past it.
    pub fn admits(&self, running_total: f64, cost: u32) -> bool {
        running_total + cost as f64 <= self.ceiling as f64
    }
}

/// Outcome of sizing a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Units admitted into the batch, a prefix of the source
    pub units_selected: usize,
    /// Units left out of the batch
    pub units_remaining: usize,
    /// Inflated prompt cost plus the cost of every admitted unit
    pub projected_total_tokens: f64,
    /// Malformed JSONL lines dropped from both counts
    #[serde(default)]
    pub units_skipped: usize,
}

impl BatchResult {
    /// Units the sizer considered (selected + remaining)
    pub fn total_units(&self) -> usize {
        self.units_selected + self.units_remaining
    }

    /// True when the whole source fits in one batch
    pub fn is_complete(&self) -> bool {
        self.units_remaining == 0
    }
}

/// Greedy prefix accumulator shared by every record format.
///
/// Units are offered in source order; the first one that does not fit closes
/// the scan and every later offer is refused.
#[derive(Debug, Clone)]
pub struct GreedyScan {
    budget: TokenBudget,
    running_total: f64,
    selected: usize,
    closed: bool,
}

impl GreedyScan {
    pub fn new(budget: TokenBudget, prompt_tokens: u32) -> Self {
        Self {
            budget,
            running_total: inflated_prompt_cost(prompt_tokens),
            selected: 0,
            closed: false,
        }
    }

    /// Offer the next unit's cost; returns whether it was admitted.
    pub fn offer(&mut self, cost: u32) -> bool {
        if self.closed {
            return false;
        }
        if !self.budget.admits(self.running_total, cost) {
            self.closed = true;
            return false;
        }
        self.running_total += cost as f64;
        self.selected += 1;
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn running_total(&self) -> f64 {
        self.running_total
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn finish(self, total_units: usize, units_skipped: usize) -> BatchResult {
        BatchResult {
            units_selected: self.selected,
            units_remaining: total_units.saturating_sub(self.selected),
            projected_total_tokens: self.running_total,
            units_skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceiling() {
        assert_eq!(TokenBudget::default().ceiling, 60_000);
    }

    #[test]
    fn test_admits_is_inclusive() {
        let budget = TokenBudget::new(100);
        assert!(budget.admits(90.0, 10));
        assert!(!budget.admits(90.5, 10));
        assert!(!budget.admits(100.0, 1));
        assert!(budget.admits(100.0, 0));
    }

    #[test]
    fn test_scan_stops_at_first_overflow() {
        let mut scan = GreedyScan::new(TokenBudget::new(100), 10);
        assert_eq!(scan.running_total(), 15.0);

        assert!(scan.offer(20));
        assert!(scan.offer(30));
        assert!(!scan.offer(50));
        assert!(scan.is_closed());

        // A smaller later unit is never backfilled
        assert!(!scan.offer(1));

        let result = scan.finish(3, 0);
        assert_eq!(result.units_selected, 2);
        assert_eq!(result.units_remaining, 1);
        assert_eq!(result.projected_total_tokens, 65.0);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_scan_ceiling_below_prompt() {
        let mut scan = GreedyScan::new(TokenBudget::new(10), 10);
        assert!(!scan.offer(1));
        let result = scan.finish(4, 0);
        assert_eq!(result.units_selected, 0);
        assert_eq!(result.units_remaining, 4);
        assert_eq!(result.projected_total_tokens, 15.0);
    }

    #[test]
    fn test_batch_result_total_units() {
        let result = BatchResult {
            units_selected: 3,
            units_remaining: 4,
            projected_total_tokens: 12.0,
            units_skipped: 2,
        };
        assert_eq!(result.total_units(), 7);
    }
}
