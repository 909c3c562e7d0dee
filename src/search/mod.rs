//! Minimum-plan search
//!
//! - Deepening: probe an exact-bound oracle from the lower bound upwards
//! - Parallel: run the deepening search for every (instance, strategy) pair,
//!   one worker per strategy

pub mod config;
pub mod deepening;
pub mod parallel;
pub mod result;

pub use config::SearchConfig;
pub use parallel::{BenchmarkJob, ExecutionMode, ParallelConfig, run_benchmark};
pub use result::{FailureReason, SearchOutcome};
