//! Benchmark instances and their generation

pub mod tasks;

pub use tasks::{DEFAULT_INSTANCES_PER_SIZE, DEFAULT_SIZES, Instance, InstanceSet, TaskGenerator};
