//! MiniZinc oracle backend
//!
//! The model template is a MiniZinc file containing a `{{SOLVE_STRATEGY}}`
//! placeholder. Each session renders one model per strategy into a private
//! temporary directory and runs the `minizinc` executable once per query,
//! passing `n`, `start_v` and `k` as command-line data.

use super::{Oracle, OracleError, OracleFactory, OracleQuery, OracleVerdict, Plan};
use crate::error::ConfigError;
use crate::strategy::Strategy;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Placeholder replaced by a strategy's solve item
pub const STRATEGY_PLACEHOLDER: &str = "{{SOLVE_STRATEGY}}";

const SOLUTION_SEPARATOR: &str = "----------";
const UNSATISFIABLE: &str = "=====UNSATISFIABLE=====";
const UNKNOWN: &str = "=====UNKNOWN=====";
const ERROR: &str = "=====ERROR=====";

/// Extra time granted past `--time-limit` before the process is killed
const KILL_GRACE: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Settings for the MiniZinc backend
#[derive(Debug, Clone)]
pub struct MiniZincConfig {
    /// Path or name of the `minizinc` executable
    pub executable: PathBuf,
    /// Solver id passed to `--solver`
    pub solver: String,
    /// Model template with the strategy placeholder
    pub template: PathBuf,
}

impl Default for MiniZincConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("minizinc"),
            solver: "gecode".to_string(),
            template: PathBuf::from("sorting_template.mzn"),
        }
    }
}

impl MiniZincConfig {
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = solver.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = template.into();
        self
    }
}

/// Substitute a strategy's solve item into the template
pub fn render_model(template: &str, strategy: Strategy) -> String {
    template.replace(STRATEGY_PLACEHOLDER, strategy.solve_item())
}

/// `-D` payload for one query
pub fn data_arguments(query: &OracleQuery<'_>) -> String {
    format!(
        "n={};start_v={};k={};",
        query.size,
        query.permutation.to_array_literal(),
        query.bound
    )
}

/// Creates MiniZinc sessions from a validated template
#[derive(Debug, Clone)]
pub struct MiniZincFactory {
    config: MiniZincConfig,
    template: Arc<str>,
}

impl MiniZincFactory {
    /// Load and validate the template. A missing file or placeholder is fatal.
    pub fn new(config: MiniZincConfig) -> Result<Self, ConfigError> {
        if !config.template.is_file() {
            return Err(ConfigError::TemplateMissing(config.template.clone()));
        }
        let template = std::fs::read_to_string(&config.template)?;
        Self::from_template(config, &template)
    }

    /// Build from template text already in memory
    pub fn from_template(config: MiniZincConfig, template: &str) -> Result<Self, ConfigError> {
        if !template.contains(STRATEGY_PLACEHOLDER) {
            return Err(ConfigError::TemplatePlaceholder(config.template.clone()));
        }
        Ok(Self {
            config,
            template: Arc::from(template),
        })
    }

    /// Version banner of the configured executable, if it can be run
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.config.executable)
            .arg("--version")
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|line| line.trim().to_string())
    }
}

impl OracleFactory for MiniZincFactory {
    type Session = MiniZincSession;

    fn open_session(&self) -> Result<Self::Session, OracleError> {
        let workdir = tempfile::Builder::new().prefix("swapsort-mzn-").tempdir()?;
        tracing::debug!(dir = %workdir.path().display(), "opened minizinc session");
        Ok(MiniZincSession {
            executable: self.config.executable.clone(),
            solver: self.config.solver.clone(),
            template: Arc::clone(&self.template),
            workdir,
            models: HashMap::new(),
        })
    }

    fn name(&self) -> &str {
        "minizinc"
    }
}

/// One worker's MiniZinc session
#[derive(Debug)]
pub struct MiniZincSession {
    executable: PathBuf,
    solver: String,
    template: Arc<str>,
    workdir: TempDir,
    models: HashMap<Strategy, PathBuf>,
}

impl MiniZincSession {
    /// Rendered model file for `strategy`, written on first use
    fn model_path(&mut self, strategy: Strategy) -> std::io::Result<PathBuf> {
        if let Some(path) = self.models.get(&strategy) {
            return Ok(path.clone());
        }
        let path = self.workdir.path().join(format!("{}.mzn", strategy.name()));
        std::fs::write(&path, render_model(&self.template, strategy))?;
        self.models.insert(strategy, path.clone());
        Ok(path)
    }

    fn run(&self, model: &Path, data: &str, timeout: Duration) -> Result<RunOutput, String> {
        let time_limit_ms = timeout.as_millis().max(1);
        let started = Instant::now();

        let mut child = Command::new(&self.executable)
            .arg("--solver")
            .arg(&self.solver)
            .arg("--time-limit")
            .arg(time_limit_ms.to_string())
            .arg("--statistics")
            .arg("-D")
            .arg(data)
            .arg(model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {}", self.executable.display(), e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        std::thread::scope(|scope| {
            let out_reader = scope.spawn(move || read_all(stdout));
            let err_reader = scope.spawn(move || read_all(stderr));

            let status = wait_with_deadline(&mut child, timeout + KILL_GRACE);

            let stdout = out_reader.join().unwrap_or_default();
            let stderr = err_reader.join().unwrap_or_default();
            let status = status?;

            Ok(RunOutput {
                stdout,
                stderr,
                success: status.success(),
                wall: started.elapsed(),
            })
        })
    }
}

struct RunOutput {
    stdout: String,
    stderr: String,
    success: bool,
    wall: Duration,
}

fn read_all<R: Read>(source: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut source) = source {
        let _ = source.read_to_string(&mut buf);
    }
    buf
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<ExitStatus, String> {
    let deadline = Instant::now() + limit;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("minizinc did not exit within {:?}", limit));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(format!("failed to wait for minizinc: {}", e)),
        }
    }
}

impl Oracle for MiniZincSession {
    fn solve(
        &mut self,
        query: &OracleQuery<'_>,
        strategy: Strategy,
        timeout: Duration,
    ) -> OracleVerdict {
        let model = match self.model_path(strategy) {
            Ok(path) => path,
            Err(e) => return OracleVerdict::Indeterminate(format!("cannot write model: {}", e)),
        };
        let data = data_arguments(query);

        match self.run(&model, &data, timeout) {
            Ok(output) => {
                classify_output(&output.stdout, &output.stderr, output.success, output.wall)
            }
            Err(message) => OracleVerdict::Indeterminate(message),
        }
    }
}

/// Turn MiniZinc output into a verdict.
///
/// `wall` is used as the elapsed time when the output carries no statistics.
pub fn classify_output(stdout: &str, stderr: &str, success: bool, wall: Duration) -> OracleVerdict {
    let has_line = |marker: &str| stdout.lines().any(|line| line.trim() == marker);

    if has_line(ERROR) {
        return OracleVerdict::Indeterminate(format!(
            "minizinc reported an error: {}",
            first_line(stderr).unwrap_or("no details")
        ));
    }
    if has_line(UNSATISFIABLE) {
        return OracleVerdict::Infeasible;
    }
    if has_line(SOLUTION_SEPARATOR) {
        let mut plan = String::new();
        for line in stdout.lines() {
            if line.trim() == SOLUTION_SEPARATOR {
                break;
            }
            if line.starts_with('%') {
                continue;
            }
            plan.push_str(line);
            plan.push('\n');
        }
        let elapsed = statistic_seconds(stdout, "time")
            .or_else(|| statistic_seconds(stdout, "solveTime"))
            .unwrap_or(wall);
        return OracleVerdict::Feasible {
            plan: Plan::from_text(plan),
            elapsed: Some(elapsed),
        };
    }
    if has_line(UNKNOWN) {
        return OracleVerdict::Indeterminate("no verdict within the time limit".to_string());
    }
    if !success {
        return OracleVerdict::Indeterminate(format!(
            "minizinc exited with an error: {}",
            first_line(stderr).unwrap_or("no details")
        ));
    }
    OracleVerdict::Indeterminate("unrecognized minizinc output".to_string())
}

/// Read `%%%mzn-stat: <key>=<seconds>` from the statistics block
fn statistic_seconds(stdout: &str, key: &str) -> Option<Duration> {
    stdout.lines().find_map(|line| {
        let stat = line.trim().strip_prefix("%%%mzn-stat:")?.trim();
        let (name, value) = stat.split_once('=')?;
        if name.trim() != key {
            return None;
        }
        let secs: f64 = value.trim().parse().ok()?;
        (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
    })
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}
