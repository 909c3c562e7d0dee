//! Configuration for benchmark execution

use serde::{Deserialize, Serialize};

/// How (instance, strategy) searches are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One worker per strategy, each running every instance
    #[default]
    Parallel,
    /// Every strategy for one instance before the next instance
    Sequential,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Parallel => write!(f, "parallel"),
            ExecutionMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Configuration for the benchmark worker pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    pub mode: ExecutionMode,
    /// Worker cap. `None` means one per strategy, `Some(0)` the CPU count.
    pub num_workers: Option<usize>,
}

impl ParallelConfig {
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            num_workers: None,
        }
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = Some(num_workers);
        self
    }

    /// Threads to spawn for `strategies` units of work
    pub fn worker_count(&self, strategies: usize) -> usize {
        let cap = match (self.mode, self.num_workers) {
            (ExecutionMode::Sequential, _) => 1,
            (ExecutionMode::Parallel, None) => strategies,
            (ExecutionMode::Parallel, Some(0)) => num_cpus::get(),
            (ExecutionMode::Parallel, Some(n)) => n,
        };
        cap.min(strategies).max(1)
    }
}
