//! Z3 oracle backend
//!
//! Encodes "sort `p` with exactly `k` transpositions" directly:
//!
//! - `s[t][p]` is the value at position `p` after `t` swaps
//! - swap `t` exchanges positions `a[t] < b[t]`
//! - `s[0]` is the input and `s[k]` the identity
//!
//! The value moved into position `a[t]` is read through a helper constant
//! tied to `s[t]` by implications, which keeps the encoding linear in `n`
//! per step.

use super::{Oracle, OracleError, OracleFactory, OracleQuery, OracleVerdict, Plan};
use crate::permutation::Transposition;
use crate::strategy::Strategy;
use std::time::{Duration, Instant};
use z3::ast::{Bool, Int};
use z3::{Params, SatResult, Solver};

/// Creates Z3 sessions
#[derive(Debug, Clone, Default)]
pub struct SmtFactory;

impl SmtFactory {
    pub fn new() -> Self {
        Self
    }
}

impl OracleFactory for SmtFactory {
    type Session = SmtSession;

    fn open_session(&self) -> Result<Self::Session, OracleError> {
        Ok(SmtSession { queries: 0 })
    }

    fn name(&self) -> &str {
        "smt"
    }
}

/// Z3 session. Solvers are built per query on the calling thread.
#[derive(Debug)]
pub struct SmtSession {
    queries: u64,
}

struct Encoding {
    first: Vec<Int>,
    second: Vec<Int>,
}

fn encode(solver: &Solver, query: &OracleQuery<'_>) -> Encoding {
    let n = query.size as i64;
    let one = Int::from_i64(1);
    let size = Int::from_i64(n);

    let mut state: Vec<Int> = query
        .permutation
        .values()
        .iter()
        .map(|&v| Int::from_i64(v as i64))
        .collect();

    let mut first = Vec::with_capacity(query.bound);
    let mut second = Vec::with_capacity(query.bound);

    for t in 0..query.bound {
        let a = Int::new_const(format!("a_{}", t));
        let b = Int::new_const(format!("b_{}", t));
        solver.assert(&a.ge(&one));
        solver.assert(&a.lt(&b));
        solver.assert(&b.le(&size));

        let at_a = Int::new_const(format!("va_{}", t));
        let at_b = Int::new_const(format!("vb_{}", t));
        for (idx, value) in state.iter().enumerate() {
            let pos = Int::from_i64(idx as i64 + 1);
            solver.assert(&a.eq(&pos).implies(&at_a.eq(value)));
            solver.assert(&b.eq(&pos).implies(&at_b.eq(value)));
        }

        let next: Vec<Int> = state
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let pos = Int::from_i64(idx as i64 + 1);
                let cell = Int::new_const(format!("s_{}_{}", t + 1, idx + 1));
                let moved = a.eq(&pos).ite(&at_b, &b.eq(&pos).ite(&at_a, value));
                solver.assert(&cell.eq(&moved));
                cell
            })
            .collect();

        state = next;
        first.push(a);
        second.push(b);
    }

    let sorted: Vec<Bool> = state
        .iter()
        .enumerate()
        .map(|(idx, value)| value.eq(&Int::from_i64(idx as i64 + 1)))
        .collect();
    for constraint in &sorted {
        solver.assert(constraint);
    }

    Encoding { first, second }
}

fn extract_swaps(solver: &Solver, encoding: &Encoding) -> Option<Vec<Transposition>> {
    let model = solver.get_model()?;
    encoding
        .first
        .iter()
        .zip(&encoding.second)
        .map(|(a, b)| {
            let i = model.eval(a, true)?.as_i64()?;
            let j = model.eval(b, true)?.as_i64()?;
            Some(Transposition::new(i as usize, j as usize))
        })
        .collect()
}

impl Oracle for SmtSession {
    fn solve(
        &mut self,
        query: &OracleQuery<'_>,
        strategy: Strategy,
        timeout: Duration,
    ) -> OracleVerdict {
        self.queries += 1;
        let started = Instant::now();

        let solver = Solver::new();
        let mut params = Params::new();
        params.set_u32("timeout", timeout.as_millis().clamp(1, u32::MAX as u128) as u32);
        for &(name, value) in strategy.smt_params() {
            params.set_u32(name, value);
        }
        solver.set_params(&params);

        let encoding = encode(&solver, query);
        tracing::trace!(
            query = self.queries,
            n = query.size,
            k = query.bound,
            "z3 check"
        );

        match solver.check() {
            SatResult::Sat => match extract_swaps(&solver, &encoding) {
                Some(swaps) => OracleVerdict::Feasible {
                    plan: Plan::from_swaps(swaps),
                    elapsed: Some(started.elapsed()),
                },
                None => OracleVerdict::Indeterminate("z3 model is incomplete".to_string()),
            },
            SatResult::Unsat => OracleVerdict::Infeasible,
            SatResult::Unknown => OracleVerdict::Indeterminate(
                solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "z3 returned unknown".to_string()),
            ),
        }
    }
}
