//! Benchmark configuration file
//!
//! Every field is optional; command-line flags override file values.
//!
//! ```toml
//! strategies = ["1_Default_Restart", "moves-first-fail"]
//! sizes = [5, 10]
//! instances_per_size = 4
//! seed = 42
//! timeout_seconds = 60
//! mode = "parallel"
//! oracle = "minizinc"
//! output = "result_benchmark_strategies"
//!
//! [minizinc]
//! solver = "gecode"
//! template = "models/sorting_template.mzn"
//! ```

use crate::benchmark::{DEFAULT_INSTANCES_PER_SIZE, DEFAULT_SIZES, TaskGenerator};
use crate::error::ConfigError;
use crate::oracle::{MiniZincConfig, OracleBackend};
use crate::search::{ExecutionMode, ParallelConfig, SearchConfig};
use crate::strategy::StrategySelection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output directory
pub const DEFAULT_OUTPUT: &str = "result_benchmark_strategies";

/// Default search budget in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// MiniZinc backend settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiniZincSection {
    pub executable: PathBuf,
    pub solver: String,
    pub template: PathBuf,
}

impl Default for MiniZincSection {
    fn default() -> Self {
        let defaults = MiniZincConfig::default();
        Self {
            executable: defaults.executable,
            solver: defaults.solver,
            template: defaults.template,
        }
    }
}

/// Full benchmark configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Strategy names or aliases; `all` selects the whole catalog
    pub strategies: Vec<String>,
    pub sizes: Vec<usize>,
    pub instances_per_size: usize,
    pub seed: Option<u64>,
    /// Instance file to load instead of generating
    pub instances: Option<PathBuf>,
    /// Wall-clock budget per search
    pub timeout_seconds: u64,
    /// Per-call oracle limit, defaults to the budget
    pub call_timeout_seconds: Option<u64>,
    pub max_bound: Option<usize>,
    /// Worker cap; 0 means the CPU count
    pub workers: Option<usize>,
    pub mode: ExecutionMode,
    pub oracle: OracleBackend,
    pub output: PathBuf,
    pub minizinc: MiniZincSection,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            strategies: vec!["all".to_string()],
            sizes: DEFAULT_SIZES.to_vec(),
            instances_per_size: DEFAULT_INSTANCES_PER_SIZE,
            seed: None,
            instances: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            call_timeout_seconds: None,
            max_bound: None,
            workers: None,
            mode: ExecutionMode::default(),
            oracle: OracleBackend::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            minizinc: MiniZincSection::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reject values that cannot describe a benchmark
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "timeout must be at least one second".to_string(),
            ));
        }
        if self.call_timeout_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "call timeout must be at least one second".to_string(),
            ));
        }
        if self.max_bound == Some(0) {
            return Err(ConfigError::Invalid(
                "max bound must be at least 1".to_string(),
            ));
        }
        self.strategy_selection()?;
        Ok(())
    }

    pub fn strategy_selection(&self) -> Result<StrategySelection, ConfigError> {
        StrategySelection::parse(&self.strategies)
    }

    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn search_config(&self) -> SearchConfig {
        let config = SearchConfig::default()
            .with_budget(self.budget())
            .with_max_bound_option(self.max_bound);
        match self.call_timeout_seconds {
            Some(secs) => config.with_call_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        let parallel = match self.mode {
            ExecutionMode::Parallel => ParallelConfig::default(),
            ExecutionMode::Sequential => ParallelConfig::sequential(),
        };
        match self.workers {
            Some(n) => parallel.with_workers(n),
            None => parallel,
        }
    }

    pub fn task_generator(&self) -> TaskGenerator {
        TaskGenerator::default()
            .with_sizes(self.sizes.clone())
            .with_per_size(self.instances_per_size)
            .with_seed_option(self.seed)
    }

    pub fn minizinc_config(&self) -> MiniZincConfig {
        MiniZincConfig::default()
            .with_executable(self.minizinc.executable.clone())
            .with_solver(self.minizinc.solver.clone())
            .with_template(self.minizinc.template.clone())
    }
}
