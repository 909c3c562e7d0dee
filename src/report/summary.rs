//! Per-strategy aggregation and the final benchmark report

use super::{RunRecord, format_seconds};
use crate::search::ExecutionMode;
use crate::strategy::Strategy;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::time::Duration;

/// Counts for one instance size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeSummary {
    pub attempted: usize,
    pub solved: usize,
    pub solved_time: Duration,
}

impl SizeSummary {
    pub fn average_time(&self) -> Option<Duration> {
        average(self.solved_time, self.solved)
    }
}

fn average(total: Duration, count: usize) -> Option<Duration> {
    u32::try_from(count)
        .ok()
        .filter(|&n| n > 0)
        .map(|n| total / n)
}

/// Aggregate results of one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub attempted: usize,
    pub solved: usize,
    /// Sum of solve times over solved instances
    pub solved_time: Duration,
    /// False when the strategy's worker stopped early
    pub complete: bool,
    /// Why the worker stopped, when it did
    pub failure: Option<String>,
    pub by_size: BTreeMap<usize, SizeSummary>,
}

impl StrategySummary {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            attempted: 0,
            solved: 0,
            solved_time: Duration::ZERO,
            complete: true,
            failure: None,
            by_size: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, record: &RunRecord) {
        let size = self.by_size.entry(record.size).or_default();
        self.attempted += 1;
        size.attempted += 1;
        if record.is_solved() {
            self.solved += 1;
            self.solved_time += record.time;
            size.solved += 1;
            size.solved_time += record.time;
        }
    }

    pub fn mark_incomplete(&mut self, reason: impl Into<String>) {
        self.complete = false;
        self.failure.get_or_insert_with(|| reason.into());
    }

    /// Mean solve time over solved instances, `None` when nothing was solved
    pub fn average_time(&self) -> Option<Duration> {
        average(self.solved_time, self.solved)
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.solved as f64 / self.attempted as f64
        }
    }
}

/// Everything the orchestrator hands back
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// One entry per strategy, in selection order
    pub summaries: Vec<StrategySummary>,
    /// Run records produced
    pub records: usize,
    pub elapsed: Duration,
    pub mode: ExecutionMode,
    pub workers: usize,
    pub backend: String,
}

impl BenchmarkReport {
    pub fn summary(&self, strategy: Strategy) -> Option<&StrategySummary> {
        self.summaries.iter().find(|s| s.strategy == strategy)
    }

    pub fn all_complete(&self) -> bool {
        self.summaries.iter().all(|s| s.complete)
    }

    /// Most solved first, then fastest average
    pub fn ranking(&self) -> Vec<&StrategySummary> {
        let mut ranked: Vec<&StrategySummary> = self.summaries.iter().collect();
        ranked.sort_by(|a, b| {
            b.solved
                .cmp(&a.solved)
                .then_with(|| match (a.average_time(), b.average_time()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.strategy.cmp(&b.strategy))
        });
        ranked
    }

    /// Short per-strategy lines for the end of the run
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        for summary in &self.summaries {
            let _ = writeln!(
                s,
                "{:<25} solved {:>3}/{:<3} ({:>5.1}%) avg {:>10}{}",
                summary.strategy.name(),
                summary.solved,
                summary.attempted,
                summary.success_rate() * 100.0,
                optional_seconds(summary.average_time()),
                if summary.complete { "" } else { "  (incomplete)" }
            );
        }
        s
    }

    pub fn to_markdown(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "# Strategy benchmark\n");
        let _ = writeln!(
            s,
            "Backend: {}, mode: {}, workers: {}, records: {}, wall time: {:.1}s\n",
            self.backend,
            self.mode,
            self.workers,
            self.records,
            self.elapsed.as_secs_f64()
        );

        let _ = writeln!(s, "## Comparison\n");
        let _ = writeln!(s, "| Rank | Strategy | Solved | Avg time (s) | Complete |");
        let _ = writeln!(s, "|---:|---|---:|---:|:---:|");
        for (rank, summary) in self.ranking().into_iter().enumerate() {
            let _ = writeln!(
                s,
                "| {} | {} | {}/{} | {} | {} |",
                rank + 1,
                summary.strategy,
                summary.solved,
                summary.attempted,
                optional_seconds(summary.average_time()),
                if summary.complete { "yes" } else { "no" }
            );
        }

        let sizes: BTreeSet<usize> = self
            .summaries
            .iter()
            .flat_map(|summary| summary.by_size.keys().copied())
            .collect();
        if !sizes.is_empty() {
            let _ = writeln!(s, "\n## Solved per size\n");
            let _ = write!(s, "| N |");
            for summary in &self.summaries {
                let _ = write!(s, " {} |", summary.strategy);
            }
            let _ = write!(s, "\n|---:|");
            for _ in &self.summaries {
                let _ = write!(s, "---|");
            }
            s.push('\n');
            for size in sizes {
                let _ = write!(s, "| {} |", size);
                for summary in &self.summaries {
                    match summary.by_size.get(&size) {
                        Some(cell) => {
                            let _ = write!(
                                s,
                                " {}/{} ({}) |",
                                cell.solved,
                                cell.attempted,
                                optional_seconds(cell.average_time())
                            );
                        }
                        None => s.push_str(" - |"),
                    }
                }
                s.push('\n');
            }
        }

        let failures: Vec<&StrategySummary> =
            self.summaries.iter().filter(|s| !s.complete).collect();
        if !failures.is_empty() {
            let _ = writeln!(s, "\n## Incomplete strategies\n");
            for summary in failures {
                let _ = writeln!(
                    s,
                    "- {}: {}",
                    summary.strategy,
                    summary.failure.as_deref().unwrap_or("stopped early")
                );
            }
        }
        s
    }
}

fn optional_seconds(d: Option<Duration>) -> String {
    d.map(format_seconds).unwrap_or_else(|| "-".to_string())
}
