//! Crawl coordinator - the discovery, dedup and dispatch loop
//!
//! Each iteration:
//! - Calls the discovery source once
//! - Picks one candidate uniformly at random
//! - Skips it if already visited
//! - Otherwise marks it visited and hands it to the worker pool
//!
//! The loop never waits for a dispatched video. It stops only when its
//! cancellation token fires, then gives the pool a grace period to drain.

use crate::config::CrawlerConfig;
use crate::crawler::counters::{CounterSnapshot, CrawlCounters};
use crate::crawler::pool::{ReserveError, WorkerPool};
use crate::crawler::{VideoProcessor, VisitedSet};
use crate::discovery::{DiscoveryResult, DiscoverySource, EmptyReason};
use crate::video::VideoId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Result of a single loop iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Discovery produced nothing to choose from
    NoCandidates(EmptyReason),

    /// The selected video was dispatched earlier in this process
    AlreadyVisited(VideoId),

    /// Every worker was busy and the queue full; the video stays unvisited
    Saturated(VideoId),

    /// The selected video was marked visited and queued for processing
    Dispatched(VideoId),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    discovery: Arc<dyn DiscoverySource>,
    processor: VideoProcessor,
    pool: WorkerPool,
    visited: VisitedSet,
    counters: Arc<CrawlCounters>,
    rng: StdRng,
    min_discovery_interval: Duration,
    shutdown_grace_period: Duration,
    progress_interval: u64,
}

impl Coordinator {
    /// Creates a coordinator and starts its worker pool
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(
        config: &CrawlerConfig,
        discovery: Arc<dyn DiscoverySource>,
        processor: VideoProcessor,
    ) -> Self {
        let pool = WorkerPool::new(
            config.max_concurrent_videos as usize,
            config.queue_capacity as usize,
        );

        Self {
            discovery,
            counters: processor.counters().clone(),
            processor,
            pool,
            visited: VisitedSet::new(),
            rng: StdRng::from_entropy(),
            min_discovery_interval: config.min_discovery_interval(),
            shutdown_grace_period: config.shutdown_grace_period(),
            progress_interval: config.progress_interval.max(1),
        }
    }

    /// Replaces the random source used for candidate selection
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Runs one discovery call and at most one dispatch
    pub async fn step(&mut self) -> IterationOutcome {
        self.counters.record_discovery_call();

        let candidates = match self.discovery.discover().await {
            DiscoveryResult::Found(candidates) => candidates,
            DiscoveryResult::Empty { reason } => {
                self.counters.record_empty_discovery();
                return IterationOutcome::NoCandidates(reason);
            }
        };

        let Some(selected) = candidates.choose(&mut self.rng).cloned() else {
            self.counters.record_empty_discovery();
            return IterationOutcome::NoCandidates(EmptyReason::NoLinks);
        };

        if self.visited.contains(&selected) {
            self.counters.record_already_visited();
            return IterationOutcome::AlreadyVisited(selected);
        }

        let slot = match self.pool.try_reserve() {
            Ok(slot) => slot,
            Err(ReserveError::Saturated) | Err(ReserveError::Closed) => {
                self.counters.record_saturated();
                return IterationOutcome::Saturated(selected);
            }
        };

        self.visited.insert(selected.clone());
        let processor = self.processor.clone();
        let video_id = selected.clone();
        slot.dispatch(processor.run(video_id));
        self.counters.record_dispatched();

        IterationOutcome::Dispatched(selected)
    }

    /// Runs the loop until `cancel` fires, then drains the worker pool
    ///
    /// Discovery call starts are spaced by at least the configured minimum
    /// interval. Returns the final counters.
    pub async fn run(mut self, cancel: CancellationToken) -> CounterSnapshot {
        tracing::info!(
            "Starting crawl ({} workers, {} queue slots, {:?} between discovery calls)",
            self.pool.max_workers(),
            self.pool.queue_capacity(),
            self.min_discovery_interval
        );

        let started = std::time::Instant::now();
        let mut iterations: u64 = 0;

        while !cancel.is_cancelled() {
            let iteration_started = Instant::now();

            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.step() => outcome,
            };
            log_outcome(&outcome);

            iterations += 1;
            if iterations % self.progress_interval == 0 {
                let snapshot = self.counters.snapshot();
                tracing::info!(
                    "Progress: {} iterations, {} visited, {} queued, {} active, {:.2} stored/min | {}",
                    iterations,
                    self.visited.len(),
                    self.pool.queued(),
                    self.pool.active(),
                    snapshot.stored as f64 * 60.0 / started.elapsed().as_secs_f64().max(1.0),
                    snapshot
                );
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep_until(iteration_started + self.min_discovery_interval) => {}
            }
        }

        tracing::info!(
            "Shutdown requested, waiting up to {:?} for {} unfinished videos ({} queued, {} active)",
            self.shutdown_grace_period,
            self.counters.snapshot().outstanding(),
            self.pool.queued(),
            self.pool.active()
        );
        self.pool.shutdown(self.shutdown_grace_period).await;

        let snapshot = self.counters.snapshot();
        tracing::info!(
            "Crawl stopped after {} iterations in {:?}: {}",
            iterations,
            started.elapsed(),
            snapshot
        );
        snapshot
    }
}

fn log_outcome(outcome: &IterationOutcome) {
    match outcome {
        IterationOutcome::NoCandidates(reason) => {
            tracing::warn!("Discovery returned no candidates: {}", reason)
        }
        IterationOutcome::AlreadyVisited(id) => {
            tracing::debug!(video_id = %id, "Already visited")
        }
        IterationOutcome::Saturated(id) => {
            tracing::debug!(video_id = %id, "Worker pool saturated, not dispatched")
        }
        IterationOutcome::Dispatched(id) => {
            tracing::info!(video_id = %id, "Dispatched video")
        }
    }
}
