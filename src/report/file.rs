//! On-disk recorder: CSV summary plus one folder of detail files per strategy

use super::{CSV_HEADER, Detail, ResultRecorder, RunRecord, summary::BenchmarkReport};
use crate::error::RecorderError;
use crate::strategy::Strategy;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the tabular summary inside the output directory
pub const SUMMARY_FILE: &str = "summary_results.csv";
/// File name of the Markdown report
pub const REPORT_FILE: &str = "report.md";

/// Writes records under an output directory
#[derive(Debug)]
pub struct FileRecorder {
    root: PathBuf,
    csv_path: PathBuf,
    sink: Mutex<File>,
}

impl FileRecorder {
    /// Create the directory layout and start a fresh summary file
    pub fn create(root: impl Into<PathBuf>, strategies: &[Strategy]) -> Result<Self, RecorderError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| RecorderError::io(&root, e))?;
        for strategy in strategies {
            let dir = root.join(strategy.name());
            fs::create_dir_all(&dir).map_err(|e| RecorderError::io(&dir, e))?;
        }

        let csv_path = root.join(SUMMARY_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&csv_path)
            .map_err(|e| RecorderError::io(&csv_path, e))?;
        writeln!(file, "{}", CSV_HEADER).map_err(|e| RecorderError::io(&csv_path, e))?;
        file.flush().map_err(|e| RecorderError::io(&csv_path, e))?;

        tracing::debug!(root = %root.display(), "created output directory");
        Ok(Self {
            root,
            csv_path,
            sink: Mutex::new(file),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn detail_path(&self, detail: &Detail<'_>) -> PathBuf {
        self.root
            .join(detail.strategy.name())
            .join(detail.file_name())
    }

    /// Write `report.md` and return its path
    pub fn write_report(&self, report: &BenchmarkReport) -> Result<PathBuf, RecorderError> {
        let path = self.root.join(REPORT_FILE);
        fs::write(&path, report.to_markdown()).map_err(|e| RecorderError::io(&path, e))?;
        Ok(path)
    }
}

impl ResultRecorder for FileRecorder {
    fn append(&self, record: &RunRecord) -> Result<(), RecorderError> {
        let mut sink = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(sink, "{}", record.csv_row())
            .and_then(|()| sink.flush())
            .map_err(|e| RecorderError::io(&self.csv_path, e))
    }

    fn write_detail(&self, detail: &Detail<'_>) -> Result<(), RecorderError> {
        let path = self.detail_path(detail);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RecorderError::io(parent, e))?;
        }
        fs::write(&path, detail.render()).map_err(|e| RecorderError::io(&path, e))
    }
}
