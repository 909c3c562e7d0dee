//! Configuration for the iterative-deepening search

use std::time::Duration;

/// Default wall-clock budget per (instance, strategy) search
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(300);

/// Limits applied to one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Total wall-clock budget for the search
    pub budget: Duration,
    /// Upper limit for a single oracle call
    pub call_timeout: Duration,
    /// Largest bound to probe before giving up
    pub max_bound: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            call_timeout: DEFAULT_BUDGET,
            max_bound: None,
        }
    }
}

impl SearchConfig {
    /// Set the budget. The per-call timeout follows unless set afterwards.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self.call_timeout = budget;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_max_bound_option(mut self, max_bound: Option<usize>) -> Self {
        self.max_bound = max_bound;
        self
    }

    /// Timeout for the next oracle call, given time already spent
    pub fn call_timeout_after(&self, spent: Duration) -> Duration {
        self.call_timeout.min(self.budget.saturating_sub(spent))
    }
}
