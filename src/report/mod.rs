//! Benchmark output: run records, detail artifacts, console progress
//!
//! Every (instance, strategy) pair yields exactly one [`RunRecord`] and one
//! [`Detail`]. Recorders are shared by all workers, so implementations
//! serialize their writes internally.

pub mod console;
pub mod file;
#[cfg(test)]
pub mod memory;
pub mod summary;

pub use console::Console;
pub use file::FileRecorder;
pub use summary::{BenchmarkReport, StrategySummary};

use crate::benchmark::Instance;
use crate::error::RecorderError;
use crate::search::{FailureReason, SearchOutcome};
use crate::strategy::Strategy;
use std::fmt;
use std::time::Duration;

/// Header of the tabular summary
pub const CSV_HEADER: &str = "ID,N,Strategy,K,Time,Status";

/// Status column of a run record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    /// Any unsolved outcome
    Timeout,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Ok => write!(f, "OK"),
            RunStatus::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

/// One row of the tabular summary
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub instance_id: u32,
    pub size: usize,
    pub strategy: Strategy,
    /// Plan length, `None` when unsolved
    pub k: Option<usize>,
    /// Solve time, or the configured timeout when unsolved
    pub time: Duration,
    pub status: RunStatus,
}

impl RunRecord {
    pub fn new(
        instance: &Instance,
        strategy: Strategy,
        outcome: &SearchOutcome,
        timeout: Duration,
    ) -> Self {
        let (k, time, status) = match outcome {
            SearchOutcome::Solved { k, elapsed, .. } => (Some(*k), *elapsed, RunStatus::Ok),
            SearchOutcome::Failed { .. } => (None, timeout, RunStatus::Timeout),
        };
        Self {
            instance_id: instance.id,
            size: instance.size,
            strategy,
            k,
            time,
            status,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status == RunStatus::Ok
    }

    /// `K` column, `-1` when unsolved
    pub fn k_column(&self) -> String {
        match self.k {
            Some(k) => k.to_string(),
            None => "-1".to_string(),
        }
    }

    /// `Time` column
    pub fn time_column(&self) -> String {
        match self.status {
            RunStatus::Ok => format_seconds(self.time),
            RunStatus::Timeout => format_limit(self.time),
        }
    }

    /// CSV line without the trailing newline
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.instance_id,
            self.size,
            self.strategy,
            self.k_column(),
            self.time_column(),
            self.status
        )
    }
}

/// Seconds with four decimals
pub fn format_seconds(d: Duration) -> String {
    format!("{:.4}", d.as_secs_f64())
}

/// Whole seconds when exact, otherwise four decimals
pub fn format_limit(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        d.as_secs().to_string()
    } else {
        format_seconds(d)
    }
}

/// Human-readable artifact for one (instance, strategy) search
#[derive(Debug, Clone, Copy)]
pub struct Detail<'a> {
    pub instance: &'a Instance,
    pub strategy: Strategy,
    pub outcome: &'a SearchOutcome,
    pub timeout: Duration,
}

impl Detail<'_> {
    /// File name inside the strategy folder
    pub fn file_name(&self) -> String {
        format!(
            "result_{:02}_N{}.txt",
            self.instance.id, self.instance.size
        )
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut s = String::new();
        s.push_str(&rule);
        s.push('\n');
        s.push_str(&format!(
            "BENCHMARK ID: {} | SIZE: {} | STRATEGY: {}\n",
            self.instance.id, self.instance.size, self.strategy
        ));
        s.push_str(&rule);
        s.push_str("\n\n");
        s.push_str(&format!("Input Vector: {}\n\n", self.instance.permutation));

        match self.outcome {
            SearchOutcome::Solved { k, plan, elapsed } => {
                s.push_str("STATUS: SOLVED\n");
                s.push_str(&format!("K: {}\n", k));
                s.push_str(&format!("TIME: {}s\n", format_seconds(*elapsed)));
                s.push_str(&"-".repeat(40));
                s.push_str("\nPLAN:\n");
                s.push_str(&plan.text);
                if !plan.text.is_empty() && !plan.text.ends_with('\n') {
                    s.push('\n');
                }
            }
            SearchOutcome::Failed { reason, .. } => {
                s.push_str(&format!(
                    "STATUS: FAILED / TIMEOUT (> {}s)\n",
                    format_limit(self.timeout)
                ));
                match reason {
                    FailureReason::Timeout => {}
                    other => s.push_str(&format!("REASON: {}\n", other)),
                }
            }
        }
        s
    }
}

/// Sink for run records and detail artifacts
pub trait ResultRecorder: Sync {
    /// Append one row. Rows from one worker keep their order.
    fn append(&self, record: &RunRecord) -> Result<(), RecorderError>;

    /// Persist the detail artifact for one search
    fn write_detail(&self, detail: &Detail<'_>) -> Result<(), RecorderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Plan;
    use crate::permutation::Permutation;

    fn instance() -> Instance {
        Instance::new(7, Permutation::new(vec![2, 3, 1]).unwrap())
    }

    fn solved() -> SearchOutcome {
        SearchOutcome::Solved {
            k: 2,
            plan: Plan::from_text("swap 1 3\nswap 1 2\n"),
            elapsed: Duration::from_micros(123_456),
        }
    }

    #[test]
    fn test_csv_row_solved() {
        let record = RunRecord::new(
            &instance(),
            Strategy::MovesFirstFail,
            &solved(),
            Duration::from_secs(300),
        );
        assert_eq!(record.csv_row(), "7,3,2_Moves_FirstFail,2,0.1235,OK");
    }

    #[test]
    fn test_csv_row_unsolved_uses_timeout() {
        let outcome = SearchOutcome::Failed {
            reason: FailureReason::OracleError("crash".into()),
            elapsed: Duration::from_millis(10),
        };
        let record = RunRecord::new(
            &instance(),
            Strategy::DefaultRestart,
            &outcome,
            Duration::from_secs(300),
        );
        assert_eq!(record.csv_row(), "7,3,1_Default_Restart,-1,300,TIMEOUT");

        let record = RunRecord::new(
            &instance(),
            Strategy::DefaultRestart,
            &outcome,
            Duration::from_millis(1500),
        );
        assert_eq!(record.time_column(), "1.5000");
    }

    #[test]
    fn test_detail_solved() {
        let instance = instance();
        let outcome = solved();
        let detail = Detail {
            instance: &instance,
            strategy: Strategy::MovesDomWdeg,
            outcome: &outcome,
            timeout: Duration::from_secs(300),
        };
        assert_eq!(detail.file_name(), "result_07_N3.txt");
        let text = detail.render();
        assert!(text.contains("BENCHMARK ID: 7 | SIZE: 3 | STRATEGY: 3_Moves_DomWdeg"));
        assert!(text.contains("Input Vector: [2, 3, 1]"));
        assert!(text.contains("STATUS: SOLVED\nK: 2\nTIME: 0.1235s\n"));
        assert!(text.ends_with("PLAN:\nswap 1 3\nswap 1 2\n"));
    }

    #[test]
    fn test_detail_failed() {
        let instance = instance();
        let timeout = SearchOutcome::Failed {
            reason: FailureReason::Timeout,
            elapsed: Duration::from_secs(60),
        };
        let detail = Detail {
            instance: &instance,
            strategy: Strategy::DefaultRestart,
            outcome: &timeout,
            timeout: Duration::from_secs(60),
        };
        let text = detail.render();
        assert!(text.contains("STATUS: FAILED / TIMEOUT (> 60s)"));
        assert!(!text.contains("REASON"));

        let error = SearchOutcome::Failed {
            reason: FailureReason::OracleError("no solver".into()),
            elapsed: Duration::ZERO,
        };
        let detail = Detail {
            outcome: &error,
            ..detail
        };
        assert!(detail.render().contains("REASON: oracle error: no solver"));
    }
}
