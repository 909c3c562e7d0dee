//! Constraint-solver oracles
//!
//! The search driver only needs one question answered: can this permutation
//! be sorted with exactly `k` swaps? An [`Oracle`] answers it with an
//! [`OracleVerdict`]. Solver faults are folded into
//! [`OracleVerdict::Indeterminate`] instead of being raised.
//!
//! Oracle sessions are never shared between threads. Each benchmark worker
//! opens its own session through an [`OracleFactory`].

pub mod minizinc;
#[cfg(test)]
pub mod scripted;
#[cfg(feature = "smt")]
pub mod smt;

pub use minizinc::{MiniZincConfig, MiniZincFactory};
#[cfg(feature = "smt")]
pub use smt::SmtFactory;

use crate::error::OracleError;
use crate::permutation::{Permutation, Transposition};
use crate::strategy::Strategy;
use std::time::Duration;

/// Data for one feasibility question
#[derive(Debug, Clone, Copy)]
pub struct OracleQuery<'a> {
    pub size: usize,
    pub permutation: &'a Permutation,
    /// Exact number of swaps the plan must use
    pub bound: usize,
}

impl<'a> OracleQuery<'a> {
    pub fn new(permutation: &'a Permutation, bound: usize) -> Self {
        Self {
            size: permutation.len(),
            permutation,
            bound,
        }
    }
}

/// A sorting plan returned by an oracle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    /// Solver output, kept verbatim for the detail artifacts
    pub text: String,
    /// Parsed swaps, empty when the output could not be parsed
    pub swaps: Vec<Transposition>,
}

impl Plan {
    /// Keep `text` and extract any `swap i j` lines from it
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let swaps = text
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                if parts.next()? != "swap" {
                    return None;
                }
                let i = parts.next()?.parse().ok()?;
                let j = parts.next()?.parse().ok()?;
                Some(Transposition::new(i, j))
            })
            .collect();
        Self { text, swaps }
    }

    /// Render a plan from known swaps
    #[cfg_attr(not(feature = "smt"), allow(dead_code))]
    pub fn from_swaps(swaps: Vec<Transposition>) -> Self {
        let text = swaps
            .iter()
            .map(|s| format!("{}\n", s))
            .collect::<String>();
        Self { text, swaps }
    }

    pub fn has_swaps(&self) -> bool {
        !self.swaps.is_empty()
    }
}

/// Answer to a single oracle query
#[derive(Debug, Clone, PartialEq)]
pub enum OracleVerdict {
    /// A plan with exactly `bound` swaps exists
    Feasible {
        plan: Plan,
        /// Solve time reported by the solver, if any
        elapsed: Option<Duration>,
    },
    /// Proven impossible with `bound` swaps
    Infeasible,
    /// Neither proven nor refuted: time limit, solver error, unrecognized status
    Indeterminate(String),
}

/// A solver session able to answer feasibility questions
pub trait Oracle {
    /// Decide whether `query` has a plan of exactly `query.bound` swaps.
    ///
    /// Blocks for at most roughly `timeout`; faults map to `Indeterminate`.
    fn solve(
        &mut self,
        query: &OracleQuery<'_>,
        strategy: Strategy,
        timeout: Duration,
    ) -> OracleVerdict;
}

/// Opens independent oracle sessions, one per worker
pub trait OracleFactory: Sync {
    type Session: Oracle;

    /// Construct a fresh session that shares no mutable state with others
    fn open_session(&self) -> Result<Self::Session, OracleError>;

    /// Backend name for logs and reports
    fn name(&self) -> &str;
}

/// Which oracle implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleBackend {
    /// External `minizinc` executable with a model template
    #[default]
    Minizinc,
    /// In-process Z3 encoding (feature `smt`)
    Smt,
}

impl std::fmt::Display for OracleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleBackend::Minizinc => write!(f, "minizinc"),
            OracleBackend::Smt => write!(f, "smt"),
        }
    }
}

impl std::str::FromStr for OracleBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minizinc" | "mzn" => Ok(OracleBackend::Minizinc),
            "smt" | "z3" => Ok(OracleBackend::Smt),
            _ => Err(format!(
                "Unknown oracle backend: '{}'. Valid options: minizinc, smt",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_text_parses_swaps() {
        let plan = Plan::from_text("moves:\nswap 1 3\nswap 2 3\nnoise\nswap 4 x\n");
        assert_eq!(
            plan.swaps,
            vec![Transposition::new(1, 3), Transposition::new(2, 3)]
        );
        assert!(plan.text.starts_with("moves:"));
    }

    #[test]
    fn test_plan_from_swaps_renders() {
        let plan = Plan::from_swaps(vec![Transposition::new(1, 2)]);
        assert_eq!(plan.text, "swap 1 2\n");
        assert_eq!(Plan::from_text(plan.text.clone()), plan);
    }

    #[test]
    fn test_query_size() {
        let p = Permutation::new(vec![3, 1, 2]).unwrap();
        let q = OracleQuery::new(&p, 2);
        assert_eq!(q.size, 3);
        assert_eq!(q.bound, 2);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            "MiniZinc".parse::<OracleBackend>().unwrap(),
            OracleBackend::Minizinc
        );
        assert_eq!("z3".parse::<OracleBackend>().unwrap(), OracleBackend::Smt);
        assert!("cplex".parse::<OracleBackend>().is_err());
    }
}
