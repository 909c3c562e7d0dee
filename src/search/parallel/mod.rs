//! Benchmark execution over many (instance, strategy) pairs.
//!
//! # Architecture
//!
//! - A **coordinator** on the calling thread aggregates worker messages into
//!   per-strategy summaries
//! - **Workers** take whole strategies from a queue and run every instance
//!   for them with their own oracle session
//! - A **channel system** carries the strategy queue and worker messages
//!
//! Sequential mode runs the same per-search step on the calling thread in
//! instance-major order.
//!
//! # Example
//!
//! ```ignore
//! let report = run_benchmark(&BenchmarkJob {
//!     instances: set.as_slice(),
//!     strategies: &StrategySelection::all(),
//!     search: &SearchConfig::default(),
//!     parallel: &ParallelConfig::default().with_workers(2),
//!     factory: &factory,
//!     recorder: &recorder,
//!     console: &Console::stdout(),
//! });
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;

pub use config::{ExecutionMode, ParallelConfig};
pub use coordinator::{BenchmarkJob, run_benchmark};
