//! Crawler module: the discovery, dedup and dispatch core
//!
//! This module contains:
//! - HTTP fetching shared by renderers and providers
//! - The visited set guaranteeing at-most-once dispatch
//! - The bounded worker pool
//! - The per-video processor
//! - Overall crawl coordination

mod coordinator;
mod counters;
mod fetcher;
mod pool;
mod processor;
mod visited;

pub use coordinator::{Coordinator, IterationOutcome};
pub use counters::{CounterSnapshot, CrawlCounters};
pub use fetcher::{build_http_client, fetch_text, FetchError};
pub use pool::{DispatchSlot, Job, ReserveError, WorkerPool};
pub use processor::{ProcessOutcome, ProcessingError, VideoProcessor};
pub use visited::VisitedSet;

use crate::config::Config;
use crate::discovery::{build_renderer, LandingPageSource};
use crate::providers::WatchPageClient;
use crate::storage::open_store;
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs a complete crawl until `shutdown` is cancelled
///
/// This wires the configured collaborators together:
/// 1. Opens the record store
/// 2. Builds the landing page renderer and discovery source
/// 3. Builds the watch page client used for metadata and transcripts
/// 4. Runs the coordinator loop, then drains the worker pool
///
/// # Arguments
///
/// * `config` - The validated harvester configuration
/// * `shutdown` - Cancelled to stop the loop
///
/// # Returns
///
/// * `Ok(CounterSnapshot)` - Final counters after a clean shutdown
/// * `Err(HarvestError)` - A collaborator could not be initialized
pub async fn run_crawl(
    config: Config,
    shutdown: CancellationToken,
) -> Result<CounterSnapshot, HarvestError> {
    let store = Arc::new(open_store(Path::new(&config.output.database_path))?);
    tracing::info!("Record store opened at {}", config.output.database_path);

    let renderer = build_renderer(&config.renderer, &config.user_agent)?;
    let landing_url = Url::parse(&config.crawler.landing_url)?;
    let discovery = Arc::new(LandingPageSource::new(renderer, landing_url));

    let client = Arc::new(WatchPageClient::new(&config.platform, &config.user_agent)?);
    let processor = VideoProcessor::new(
        client.clone(),
        client,
        store,
        Arc::new(CrawlCounters::new()),
    );

    let coordinator = Coordinator::new(&config.crawler, discovery, processor);
    Ok(coordinator.run(shutdown).await)
}
