//! Iterative deepening over an exact-bound oracle
//!
//! Probes k = max(1, k_min), k_min + 1, ... until the oracle finds a plan,
//! reports an undecided call, or the budget runs out. The first feasible
//! bound is the minimum, since every smaller one was refuted.

use crate::oracle::{Oracle, OracleQuery, OracleVerdict};
use crate::permutation::{Permutation, lower_bound};
use crate::search::config::SearchConfig;
use crate::search::result::{FailureReason, SearchOutcome, SearchResult, SearchStatistics};
use crate::strategy::Strategy;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Find the minimum number of swaps sorting `permutation`
pub fn run_search<O: Oracle + ?Sized>(
    oracle: &mut O,
    permutation: &Permutation,
    strategy: Strategy,
    config: &SearchConfig,
) -> SearchResult {
    let started = Instant::now();
    let k_min = lower_bound(permutation);
    let mut statistics = SearchStatistics::new(k_min);
    let mut k = k_min.max(1);

    tracing::debug!(n = permutation.len(), k_min, strategy = %strategy, "starting search");

    let outcome = loop {
        if config.max_bound.is_some_and(|max| k > max) {
            break SearchOutcome::Failed {
                reason: FailureReason::InfeasibleWithinBound,
                elapsed: started.elapsed(),
            };
        }

        let spent = started.elapsed();
        if spent >= config.budget {
            break SearchOutcome::Failed {
                reason: FailureReason::Timeout,
                elapsed: config.budget,
            };
        }

        let timeout = config.call_timeout_after(spent);
        statistics.record_probe(k);
        let call_started = Instant::now();
        let query = OracleQuery::new(permutation, k);
        // a crashing call ends this search only
        let verdict =
            panic::catch_unwind(AssertUnwindSafe(|| oracle.solve(&query, strategy, timeout)))
                .unwrap_or_else(|payload| {
                    let message = panic_message(&*payload);
                    OracleVerdict::Indeterminate(format!("oracle panicked: {}", message))
                });

        match verdict {
            OracleVerdict::Feasible { plan, elapsed } => {
                if plan.has_swaps() && !permutation.sorted_by(&plan.swaps) {
                    tracing::warn!(
                        strategy = %strategy,
                        k,
                        "returned plan does not sort the permutation"
                    );
                }
                break SearchOutcome::Solved {
                    k,
                    plan,
                    elapsed: elapsed.unwrap_or_else(|| call_started.elapsed()),
                };
            }
            OracleVerdict::Infeasible => {
                tracing::trace!(k, strategy = %strategy, "infeasible");
                statistics.infeasible_probes += 1;
                k += 1;
            }
            OracleVerdict::Indeterminate(reason) => {
                tracing::debug!(k, strategy = %strategy, %reason, "oracle undecided");
                break SearchOutcome::Failed {
                    reason: FailureReason::OracleError(reason),
                    elapsed: started.elapsed(),
                };
            }
        }
    };

    statistics.elapsed_time = started.elapsed();
    SearchResult {
        outcome,
        statistics,
    }
}

/// Text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
