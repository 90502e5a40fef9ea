//! Bounded worker pool
//!
//! Jobs wait in a bounded queue and a pump task starts them as worker
//! slots free up. Dispatch never waits: a caller reserves a queue slot
//! up front and learns immediately when the pool is saturated.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// A unit of work run by the pool
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Why a queue slot could not be reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveError {
    /// Every worker is busy and the queue is full
    Saturated,
    /// The pool is shutting down
    Closed,
}

/// A reserved place in the pool's queue
pub struct DispatchSlot<'a> {
    permit: mpsc::Permit<'a, Job>,
}

impl DispatchSlot<'_> {
    /// Queues the job; the caller does not wait for it to start or finish
    pub fn dispatch<F>(self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.permit.send(Box::pin(job));
    }
}

pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    running: Arc<AtomicUsize>,
    max_workers: usize,
    abort: CancellationToken,
    pump: JoinHandle<()>,
}

impl WorkerPool {
    /// Starts the pump task; must be called within a Tokio runtime
    pub fn new(max_workers: usize, queue_capacity: usize) -> Self {
        let max_workers = max_workers.max(1);
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let workers = Arc::new(Semaphore::new(max_workers));
        let running = Arc::new(AtomicUsize::new(0));
        let abort = CancellationToken::new();

        let pump = tokio::spawn(pump(receiver, workers, running.clone(), abort.clone()));

        Self {
            sender,
            running,
            max_workers,
            abort,
            pump,
        }
    }

    pub fn try_reserve(&self) -> Result<DispatchSlot<'_>, ReserveError> {
        match self.sender.try_reserve() {
            Ok(permit) => Ok(DispatchSlot { permit }),
            Err(mpsc::error::TrySendError::Full(())) => Err(ReserveError::Saturated),
            Err(mpsc::error::TrySendError::Closed(())) => Err(ReserveError::Closed),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Jobs waiting for a worker
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Jobs currently running
    pub fn active(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Closes the queue and waits for queued and running jobs
    ///
    /// Jobs still unfinished once `grace` has elapsed are aborted; queued
    /// jobs that never started are dropped.
    pub async fn shutdown(self, grace: Duration) {
        let Self {
            sender,
            abort,
            mut pump,
            ..
        } = self;
        drop(sender);

        let finished = match tokio::time::timeout(grace, &mut pump).await {
            Ok(result) => Some(result),
            Err(_) => {
                tracing::warn!(
                    "Grace period of {:?} elapsed, aborting remaining jobs",
                    grace
                );
                abort.cancel();
                None
            }
        };

        let result = match finished {
            Some(result) => result,
            None => pump.await,
        };
        if let Err(e) = result {
            tracing::error!("Worker pool pump failed: {}", e);
        }
    }
}

async fn pump(
    mut receiver: mpsc::Receiver<Job>,
    workers: Arc<Semaphore>,
    running: Arc<AtomicUsize>,
    abort: CancellationToken,
) {
    let mut jobs = JoinSet::new();

    loop {
        let permit = tokio::select! {
            _ = abort.cancelled() => break,
            Some(result) = jobs.join_next() => {
                report(result);
                continue;
            }
            permit = workers.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let job = tokio::select! {
            _ = abort.cancelled() => break,
            Some(result) = jobs.join_next() => {
                report(result);
                continue;
            }
            job = receiver.recv() => job,
        };

        match job {
            Some(job) => {
                let guard = RunningGuard::enter(running.clone());
                jobs.spawn(async move {
                    job.await;
                    drop(guard);
                    drop(permit);
                });
            }
            None => break,
        }
    }

    // Queue closed or abort requested; nothing new starts from here on
    drop(receiver);

    loop {
        tokio::select! {
            _ = abort.cancelled() => {
                jobs.abort_all();
                while let Some(result) = jobs.join_next().await {
                    report(result);
                }
                break;
            }
            result = jobs.join_next() => match result {
                Some(result) => report(result),
                None => break,
            },
        }
    }
}

/// Counts a job as running until dropped, including on panic or abort
struct RunningGuard(Arc<AtomicUsize>);

impl RunningGuard {
    fn enter(running: Arc<AtomicUsize>) -> Self {
        running.fetch_add(1, Ordering::SeqCst);
        Self(running)
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn report(result: Result<(), JoinError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => tracing::debug!("Job aborted at shutdown"),
        Err(e) => tracing::error!("Job panicked: {}", e),
    }
}
