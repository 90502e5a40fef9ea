//! Runtime counters shared by the crawl loop and its workers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for one crawl
#[derive(Debug, Default)]
pub struct CrawlCounters {
    discovery_calls: AtomicU64,
    empty_discoveries: AtomicU64,
    already_visited: AtomicU64,
    saturated: AtomicU64,
    dispatched: AtomicU64,
    stored: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of `CrawlCounters`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub discovery_calls: u64,
    pub empty_discoveries: u64,
    pub already_visited: u64,
    pub saturated: u64,
    pub dispatched: u64,
    pub stored: u64,
    pub failed: u64,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_discovery_call(&self) {
        self.discovery_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_discovery(&self) {
        self.empty_discoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_already_visited(&self) {
        self.already_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_saturated(&self) {
        self.saturated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            discovery_calls: self.discovery_calls.load(Ordering::Relaxed),
            empty_discoveries: self.empty_discoveries.load(Ordering::Relaxed),
            already_visited: self.already_visited.load(Ordering::Relaxed),
            saturated: self.saturated.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl CounterSnapshot {
    /// Dispatched videos that have neither been stored nor failed yet
    pub fn outstanding(&self) -> u64 {
        self.dispatched
            .saturating_sub(self.stored)
            .saturating_sub(self.failed)
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovery calls ({} empty, {} already visited, {} saturated), \
             {} dispatched, {} stored, {} failed",
            self.discovery_calls,
            self.empty_discoveries,
            self.already_visited,
            self.saturated,
            self.dispatched,
            self.stored,
            self.failed
        )
    }
}
