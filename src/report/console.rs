//! Progress table printed while the benchmark runs

use super::{RunRecord, RunStatus, format_limit, format_seconds};
use std::io::{self, Write};
use std::sync::Mutex;

const WIDTH: usize = 85;

/// Line-oriented progress output shared by all workers
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Console {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    /// Discards everything
    pub fn sink() -> Self {
        Self::from_writer(io::sink())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one whole line. Console failures are not fatal to the benchmark.
    pub fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|p| p.into_inner());
        let _ = writeln!(out, "{}", text).and_then(|()| out.flush());
    }

    pub fn rule(&self) {
        self.line(&"-".repeat(WIDTH));
    }

    pub fn header(&self, instances: usize, strategies: usize) {
        self.line(&format!(
            "=== STRATEGY BENCHMARK: {} INSTANCES x {} STRATEGIES ===",
            instances, strategies
        ));
        self.rule();
        self.line(&format!(
            "{:<5} | {:<3} | {:<25} | {:<3} | {:<10}",
            "Inst", "N", "Strategy", "K", "Time (s)"
        ));
        self.rule();
    }

    pub fn progress(&self, record: &RunRecord) {
        self.line(&progress_line(record));
    }
}

/// Table row for one finished search
pub fn progress_line(record: &RunRecord) -> String {
    let time = match record.status {
        RunStatus::Ok => format_seconds(record.time),
        RunStatus::Timeout => format!(">{}s", format_limit(record.time)),
    };
    format!(
        "#{:<4} | {:<3} | {:<25} | {:<3} | {:<10}",
        record.instance_id,
        record.size,
        record.strategy.name(),
        record.k_column(),
        time
    )
}
