//! Benchmark coordinator that manages worker threads.

use crate::benchmark::Instance;
use crate::error::RecorderError;
use crate::oracle::OracleFactory;
use crate::report::{
    BenchmarkReport, Console, Detail, ResultRecorder, RunRecord, StrategySummary, format_seconds,
};
use crate::search::config::SearchConfig;
use crate::search::deepening::{panic_message, run_search};
use crate::search::parallel::channel::{
    CoordinatorChannels, SharedProgress, WorkerChannels, WorkerMessage, create_channels,
};
use crate::search::parallel::config::{ExecutionMode, ParallelConfig};
use crate::search::result::{FailureReason, SearchOutcome};
use crate::strategy::{Strategy, StrategySelection};
use crossbeam_channel::Sender;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Everything one benchmark run needs, borrowed from the caller
pub struct BenchmarkJob<'a, F, R: ?Sized> {
    pub instances: &'a [Instance],
    pub strategies: &'a StrategySelection,
    pub search: &'a SearchConfig,
    pub parallel: &'a ParallelConfig,
    pub factory: &'a F,
    pub recorder: &'a R,
    pub console: &'a Console,
}

/// Run every strategy over every instance and aggregate the results.
///
/// Failed searches never stop a loop. A worker-level failure (session setup,
/// recorder error, panic) stops only the affected strategy, which is then
/// reported as incomplete.
pub fn run_benchmark<F, R>(job: &BenchmarkJob<'_, F, R>) -> BenchmarkReport
where
    F: OracleFactory,
    R: ResultRecorder + ?Sized,
{
    let start_time = Instant::now();
    let strategies = job.strategies.strategies();
    let num_workers = job.parallel.worker_count(strategies.len());
    let progress = SharedProgress::new(job.instances.len() * strategies.len());

    tracing::info!(
        instances = job.instances.len(),
        strategies = strategies.len(),
        mode = %job.parallel.mode,
        workers = num_workers,
        backend = job.factory.name(),
        "starting benchmark"
    );

    let (coordinator_channels, worker_channels) = create_channels(strategies);

    let (summaries, records) = match job.parallel.mode {
        ExecutionMode::Sequential => {
            let worker = Worker {
                id: 0,
                job,
                progress: &progress,
                to_coordinator: worker_channels.to_coordinator.clone(),
            };
            worker.run_sequential();
            drop(worker);
            drop(worker_channels);
            run_coordinator(coordinator_channels, strategies)
        }
        ExecutionMode::Parallel => std::thread::scope(|scope| {
            for worker_id in 0..num_workers {
                let channels = worker_channels.clone();
                let progress = &progress;
                scope.spawn(move || run_worker(worker_id, job, progress, channels));
            }
            // workers hold the remaining senders
            drop(worker_channels);
            run_coordinator(coordinator_channels, strategies)
        }),
    };

    let report = BenchmarkReport {
        summaries,
        records,
        elapsed: start_time.elapsed(),
        mode: job.parallel.mode,
        workers: num_workers,
        backend: job.factory.name().to_string(),
    };
    tracing::info!(
        records = report.records,
        elapsed = ?report.elapsed,
        complete = report.all_complete(),
        "benchmark finished"
    );
    report
}

/// Coordinator loop that receives messages from workers and aggregates results.
fn run_coordinator(
    channels: CoordinatorChannels,
    strategies: &[Strategy],
) -> (Vec<StrategySummary>, usize) {
    let mut summaries: Vec<StrategySummary> =
        strategies.iter().copied().map(StrategySummary::new).collect();
    let mut finished: HashSet<Strategy> = HashSet::new();
    let mut records = 0;

    // ends when every sender is dropped
    for msg in channels.from_workers.iter() {
        match msg {
            WorkerMessage::Progress { worker_id, record } => {
                records += 1;
                tracing::trace!(
                    worker_id,
                    instance = record.instance_id,
                    strategy = %record.strategy,
                    "record received"
                );
                if let Some(summary) = summaries.iter_mut().find(|s| s.strategy == record.strategy) {
                    summary.record(&record);
                }
            }
            WorkerMessage::Finished {
                worker_id,
                strategy,
            } => {
                finished.insert(strategy);
                if let Some(summary) = summaries.iter().find(|s| s.strategy == strategy) {
                    tracing::info!(
                        worker_id,
                        strategy = %strategy,
                        solved = summary.solved,
                        attempted = summary.attempted,
                        avg_time = %summary
                            .average_time()
                            .map(format_seconds)
                            .unwrap_or_else(|| "-".to_string()),
                        "strategy finished"
                    );
                }
            }
            WorkerMessage::Failed {
                worker_id,
                strategy,
                message,
            } => {
                tracing::warn!(worker_id, strategy = %strategy, %message, "strategy incomplete");
                finished.insert(strategy);
                if let Some(summary) = summaries.iter_mut().find(|s| s.strategy == strategy) {
                    summary.mark_incomplete(message);
                }
            }
        }
    }

    for summary in &mut summaries {
        if !finished.contains(&summary.strategy) {
            summary.mark_incomplete("worker exited without reporting");
        }
    }

    (summaries, records)
}

/// Worker thread body: take strategies from the queue until it is empty.
fn run_worker<F, R>(
    worker_id: usize,
    job: &BenchmarkJob<'_, F, R>,
    progress: &SharedProgress,
    channels: WorkerChannels,
) where
    F: OracleFactory,
    R: ResultRecorder + ?Sized,
{
    let worker = Worker {
        id: worker_id,
        job,
        progress,
        to_coordinator: channels.to_coordinator,
    };

    while let Ok(strategy) = channels.jobs.recv() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| worker.run_strategy(strategy)));
        if let Err(payload) = result {
            worker.fail(strategy, format!("worker panicked: {}", panic_message(&*payload)));
        }
    }
}

struct Worker<'a, 'j, F, R: ?Sized> {
    id: usize,
    job: &'a BenchmarkJob<'j, F, R>,
    progress: &'a SharedProgress,
    to_coordinator: Sender<WorkerMessage>,
}

impl<F, R> Worker<'_, '_, F, R>
where
    F: OracleFactory,
    R: ResultRecorder + ?Sized,
{
    fn open_session(&self, strategy: Strategy) -> Result<F::Session, String> {
        self.job.factory.open_session().map_err(|e| {
            tracing::error!(worker_id = self.id, strategy = %strategy, error = %e, "cannot open oracle session");
            format!("cannot open oracle session: {}", e)
        })
    }

    /// All instances for one strategy, in order
    fn run_strategy(&self, strategy: Strategy) {
        tracing::info!(worker_id = self.id, strategy = %strategy, "strategy started");
        let (mut session, session_error) = match self.open_session(strategy) {
            Ok(session) => (Some(session), None),
            Err(message) => (None, Some(message)),
        };

        for instance in self.job.instances {
            if let Err(e) = self.step(session.as_mut(), session_error.as_deref(), instance, strategy) {
                self.fail(strategy, e.to_string());
                return;
            }
        }

        match session_error {
            Some(message) => self.fail(strategy, message),
            None => self.send(WorkerMessage::Finished {
                worker_id: self.id,
                strategy,
            }),
        }
    }

    /// Instance-major order with one session per strategy opened up front
    fn run_sequential(&self) {
        struct Slot<S> {
            strategy: Strategy,
            session: Option<S>,
            session_error: Option<String>,
            active: bool,
        }

        let mut slots: Vec<Slot<F::Session>> = self
            .job
            .strategies
            .strategies()
            .iter()
            .map(|&strategy| match self.open_session(strategy) {
                Ok(session) => Slot {
                    strategy,
                    session: Some(session),
                    session_error: None,
                    active: true,
                },
                Err(message) => Slot {
                    strategy,
                    session: None,
                    session_error: Some(message),
                    active: true,
                },
            })
            .collect();

        for instance in self.job.instances {
            for slot in slots.iter_mut().filter(|slot| slot.active) {
                let strategy = slot.strategy;
                let session_error = slot.session_error.as_deref();
                let session = slot.session.as_mut();
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    self.step(session, session_error, instance, strategy)
                }));
                let failure = match result {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(payload) => Some(format!("worker panicked: {}", panic_message(&*payload))),
                };
                if let Some(message) = failure {
                    self.fail(strategy, message);
                    slot.active = false;
                }
            }
        }

        for slot in slots.into_iter().filter(|slot| slot.active) {
            match slot.session_error {
                Some(message) => self.fail(slot.strategy, message),
                None => self.send(WorkerMessage::Finished {
                    worker_id: self.id,
                    strategy: slot.strategy,
                }),
            }
        }
    }

    /// Search one instance, then record, print and report it
    fn step(
        &self,
        session: Option<&mut F::Session>,
        session_error: Option<&str>,
        instance: &Instance,
        strategy: Strategy,
    ) -> Result<(), RecorderError> {
        let search = self.job.search;
        let outcome = match session {
            Some(session) => {
                let result = run_search(session, &instance.permutation, strategy, search);
                let stats = &result.statistics;
                tracing::trace!(
                    worker_id = self.id,
                    instance = instance.id,
                    lower_bound = stats.lower_bound,
                    probes = stats.probes,
                    infeasible = stats.infeasible_probes,
                    rate = stats.probe_rate(),
                    "search statistics"
                );
                result.outcome
            }
            None => SearchOutcome::Failed {
                reason: FailureReason::OracleError(
                    session_error.unwrap_or("no oracle session").to_string(),
                ),
                elapsed: Duration::ZERO,
            },
        };

        let record = RunRecord::new(instance, strategy, &outcome, search.budget);
        self.job.recorder.append(&record)?;
        self.job.console.progress(&record);
        let done = self.progress.advance();
        tracing::debug!(
            worker_id = self.id,
            instance = instance.id,
            strategy = %strategy,
            done,
            total = self.progress.total(),
            "{}",
            outcome
        );
        self.send(WorkerMessage::Progress {
            worker_id: self.id,
            record,
        });

        self.job.recorder.write_detail(&Detail {
            instance,
            strategy,
            outcome: &outcome,
            timeout: search.budget,
        })
    }

    fn fail(&self, strategy: Strategy, message: String) {
        tracing::error!(worker_id = self.id, strategy = %strategy, %message, "stopping strategy");
        self.send(WorkerMessage::Failed {
            worker_id: self.id,
            strategy,
            message,
        });
    }

    fn send(&self, msg: WorkerMessage) {
        // the coordinator outlives every worker
        let _ = self.to_coordinator.send(msg);
    }
}
