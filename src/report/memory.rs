//! In-memory recorders for orchestrator tests

use super::{Detail, ResultRecorder, RunRecord};
use crate::error::RecorderError;
use crate::strategy::Strategy;
use std::io;
use std::sync::Mutex;

/// Keeps rows and rendered details in memory
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    rows: Mutex<Vec<String>>,
    records: Mutex<Vec<RunRecord>>,
    details: Mutex<Vec<(String, String)>>,
    /// Strategies whose writes fail
    failing: Vec<Strategy>,
    /// Strategies whose detail writes panic
    panicking: Vec<Strategy>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(strategies: Vec<Strategy>) -> Self {
        Self {
            failing: strategies,
            ..Self::default()
        }
    }

    pub fn panicking_for(strategies: Vec<Strategy>) -> Self {
        Self {
            panicking: strategies,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<String> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn records(&self) -> Vec<RunRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// (relative path, contents) of every detail written
    pub fn details(&self) -> Vec<(String, String)> {
        self.details.lock().map(|d| d.clone()).unwrap_or_default()
    }

    fn check(&self, strategy: Strategy) -> Result<(), RecorderError> {
        if self.failing.contains(&strategy) {
            return Err(RecorderError::io(
                strategy.name(),
                io::Error::other("disk full"),
            ));
        }
        Ok(())
    }
}

impl ResultRecorder for MemoryRecorder {
    fn append(&self, record: &RunRecord) -> Result<(), RecorderError> {
        self.check(record.strategy)?;
        // one lock for both so rows and records stay aligned
        let mut rows = self.rows.lock().unwrap_or_else(|p| p.into_inner());
        rows.push(record.csv_row());
        self.records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(record.clone());
        Ok(())
    }

    fn write_detail(&self, detail: &Detail<'_>) -> Result<(), RecorderError> {
        self.check(detail.strategy)?;
        if self.panicking.contains(&detail.strategy) {
            panic!("detail writer crashed");
        }
        let path = format!("{}/{}", detail.strategy.name(), detail.file_name());
        self.details
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((path, detail.render()));
        Ok(())
    }
}
