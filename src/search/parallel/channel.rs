//! Channels between benchmark workers and the coordinator

use crate::report::RunRecord;
use crate::strategy::Strategy;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// One search finished and was recorded.
    Progress { worker_id: usize, record: RunRecord },
    /// Worker ran every instance for the strategy.
    Finished { worker_id: usize, strategy: Strategy },
    /// Worker stopped the strategy early, or ran it without a session.
    Failed {
        worker_id: usize,
        strategy: Strategy,
        message: String,
    },
}

/// Counter of finished searches across all workers.
#[derive(Debug)]
pub struct SharedProgress {
    completed: AtomicUsize,
    total: usize,
}

impl SharedProgress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Count one search and return the new total
    pub fn advance(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Channel endpoints for a worker.
#[derive(Clone)]
pub struct WorkerChannels {
    /// Strategies still waiting for a worker.
    pub jobs: Receiver<Strategy>,
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers.
    pub from_workers: Receiver<WorkerMessage>,
}

/// Queue every strategy and create the message channel.
///
/// The job queue is closed once filled, so workers stop when it drains.
pub fn create_channels(strategies: &[Strategy]) -> (CoordinatorChannels, WorkerChannels) {
    let (job_tx, job_rx) = unbounded();
    for &strategy in strategies {
        // the receiver is alive, so sending cannot fail
        let _ = job_tx.send(strategy);
    }
    drop(job_tx);

    // workers never block on reporting
    let (worker_tx, coordinator_rx) = unbounded();

    (
        CoordinatorChannels {
            from_workers: coordinator_rx,
        },
        WorkerChannels {
            jobs: job_rx,
            to_coordinator: worker_tx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_progress() {
        let progress = SharedProgress::new(6);
        assert_eq!(progress.advance(), 1);
        assert_eq!(progress.advance(), 2);
        assert_eq!(progress.total(), 6);
    }

    #[test]
    fn test_jobs_drain_then_close() {
        let (_coordinator, worker) = create_channels(&Strategy::ALL);
        let drained: Vec<Strategy> = worker.jobs.iter().collect();
        assert_eq!(drained, Strategy::ALL.to_vec());
        assert!(worker.jobs.recv().is_err());
    }

    #[test]
    fn test_messages_reach_coordinator() {
        let (coordinator, worker) = create_channels(&[Strategy::DefaultRestart]);
        worker
            .to_coordinator
            .send(WorkerMessage::Finished {
                worker_id: 0,
                strategy: Strategy::DefaultRestart,
            })
            .unwrap();
        drop(worker);

        let received: Vec<WorkerMessage> = coordinator.from_workers.iter().collect();
        assert_eq!(received.len(), 1);
        match &received[0] {
            WorkerMessage::Finished {
                worker_id,
                strategy,
            } => {
                assert_eq!(*worker_id, 0);
                assert_eq!(*strategy, Strategy::DefaultRestart);
            }
            other => panic!("Unexpected message type: {:?}", other),
        }
    }
}
