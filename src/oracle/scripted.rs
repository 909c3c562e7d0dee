//! Deterministic in-process oracle for tests

use super::{Oracle, OracleError, OracleFactory, OracleQuery, OracleVerdict, Plan};
use crate::permutation::{Permutation, lower_bound};
use crate::strategy::Strategy;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Rule = dyn Fn(&OracleQuery<'_>, Strategy) -> OracleVerdict + Send + Sync;

/// One recorded oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub strategy: Strategy,
    pub permutation: Permutation,
    pub bound: usize,
    pub timeout: Duration,
}

/// Factory whose sessions answer from a shared rule
#[derive(Clone)]
pub struct ScriptedFactory {
    rule: Arc<Rule>,
    probes: Arc<Mutex<Vec<Probe>>>,
    delay: Duration,
    failing: Vec<Strategy>,
    sessions: Arc<Mutex<usize>>,
}

impl ScriptedFactory {
    pub fn new(
        rule: impl Fn(&OracleQuery<'_>, Strategy) -> OracleVerdict + Send + Sync + 'static,
    ) -> Self {
        Self {
            rule: Arc::new(rule),
            probes: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
            failing: Vec::new(),
            sessions: Arc::new(Mutex::new(0)),
        }
    }

    /// Feasible exactly when the bound reaches the lower bound
    pub fn exact() -> Self {
        Self::new(|query, _| {
            if query.bound >= lower_bound(query.permutation).max(1) {
                OracleVerdict::Feasible {
                    plan: Plan::from_text(format!("{} swaps\n", query.bound)),
                    elapsed: Some(Duration::from_millis(5)),
                }
            } else {
                OracleVerdict::Infeasible
            }
        })
    }

    /// Never feasible
    pub fn infeasible() -> Self {
        Self::new(|_, _| OracleVerdict::Infeasible)
    }

    /// Sleep this long in every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answer `Indeterminate` for every call made with one of `strategies`
    pub fn with_failing(mut self, strategies: Vec<Strategy>) -> Self {
        self.failing = strategies;
        self
    }

    pub fn probes(&self) -> Vec<Probe> {
        self.probes.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions.lock().map(|n| *n).unwrap_or_default()
    }
}

impl OracleFactory for ScriptedFactory {
    type Session = ScriptedSession;

    fn open_session(&self) -> Result<Self::Session, OracleError> {
        if let Ok(mut n) = self.sessions.lock() {
            *n += 1;
        }
        Ok(ScriptedSession {
            factory: self.clone(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Session handed to one worker
pub struct ScriptedSession {
    factory: ScriptedFactory,
}

impl Oracle for ScriptedSession {
    fn solve(
        &mut self,
        query: &OracleQuery<'_>,
        strategy: Strategy,
        timeout: Duration,
    ) -> OracleVerdict {
        if self.factory.failing.contains(&strategy) {
            return OracleVerdict::Indeterminate("scripted failure".to_string());
        }
        if let Ok(mut probes) = self.factory.probes.lock() {
            probes.push(Probe {
                strategy,
                permutation: query.permutation.clone(),
                bound: query.bound,
                timeout,
            });
        }
        if !self.factory.delay.is_zero() {
            std::thread::sleep(self.factory.delay);
        }
        (self.factory.rule)(query, strategy)
    }
}

/// Factory whose sessions can never be opened
pub struct BrokenFactory;

impl OracleFactory for BrokenFactory {
    type Session = ScriptedSession;

    fn open_session(&self) -> Result<Self::Session, OracleError> {
        Err(OracleError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "solver not installed",
        )))
    }

    fn name(&self) -> &str {
        "broken"
    }
}
