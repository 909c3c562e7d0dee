//! Search outcome types and statistics

use crate::oracle::Plan;
use std::fmt;
use std::time::Duration;

/// Why a search ended without a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Every bound up to the configured cap was infeasible
    InfeasibleWithinBound,
    /// The oracle could not decide a probe
    OracleError(String),
    /// The wall-clock budget ran out
    Timeout,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::InfeasibleWithinBound => write!(f, "infeasible within bound"),
            FailureReason::OracleError(msg) => write!(f, "oracle error: {}", msg),
            FailureReason::Timeout => write!(f, "timeout"),
        }
    }
}

/// Result of one (instance, strategy) search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Minimum plan found at bound `k`
    Solved {
        k: usize,
        plan: Plan,
        elapsed: Duration,
    },
    Failed {
        reason: FailureReason,
        elapsed: Duration,
    },
}

impl SearchOutcome {
    /// Plan length when solved
    pub fn k(&self) -> Option<usize> {
        match self {
            SearchOutcome::Solved { k, .. } => Some(*k),
            SearchOutcome::Failed { .. } => None,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Solved { k, elapsed, .. } => {
                write!(f, "solved with {} swaps in {:.4}s", k, elapsed.as_secs_f64())
            }
            SearchOutcome::Failed { reason, elapsed } => {
                write!(f, "failed ({}) after {:.4}s", reason, elapsed.as_secs_f64())
            }
        }
    }
}

/// Statistics from one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Lower bound computed for the input
    pub lower_bound: usize,
    /// Oracle calls issued
    pub probes: u64,
    /// Calls answered infeasible
    pub infeasible_probes: u64,
    /// First bound probed
    pub first_bound: Option<usize>,
    /// Last bound probed
    pub last_bound: Option<usize>,
    /// Wall time of the whole search
    pub elapsed_time: Duration,
}

impl SearchStatistics {
    pub fn new(lower_bound: usize) -> Self {
        Self {
            lower_bound,
            ..Default::default()
        }
    }

    pub fn record_probe(&mut self, bound: usize) {
        self.probes += 1;
        self.first_bound.get_or_insert(bound);
        self.last_bound = Some(bound);
    }

    /// Probes per second of wall time
    pub fn probe_rate(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.probes as f64 / secs
        }
    }
}

/// Outcome plus the statistics gathered on the way
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub statistics: SearchStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let solved = SearchOutcome::Solved {
            k: 3,
            plan: Plan::default(),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(solved.k(), Some(3));
        assert_eq!(solved.to_string(), "solved with 3 swaps in 1.5000s");

        let failed = SearchOutcome::Failed {
            reason: FailureReason::OracleError("boom".into()),
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(failed.k(), None);
        assert!(failed.to_string().contains("oracle error: boom"));
    }

    #[test]
    fn test_record_probe() {
        let mut stats = SearchStatistics::new(4);
        stats.record_probe(4);
        stats.record_probe(5);
        stats.record_probe(6);
        assert_eq!(stats.probes, 3);
        assert_eq!(stats.first_bound, Some(4));
        assert_eq!(stats.last_bound, Some(6));
    }

    #[test]
    fn test_statistics_zero_division() {
        let stats = SearchStatistics::default();
        assert_eq!(stats.probe_rate(), 0.0);
    }
}
